//! Message catalogue.
//!
//! Two message sets cross the pipes:
//!
//! - [`engine`]: operations the BA calls on the engine ([`EngineRequest`]).
//! - [`application`]: notifications the engine sends to the BA ([`Notification`]).
//!
//! Each set is declared once with [`message_set!`](crate::message_set), which
//! generates per message an args struct, a results struct and a marker type
//! implementing [`Exchange`]; for the whole set an enum implementing
//! [`MessageSet`] and a callbacks trait with one method per message.
//!
//! [`EngineRequest`]: engine::EngineRequest
//! [`Notification`]: application::Notification

use std::fmt;

use bytes::Bytes;

use crate::codec::WireStruct;
use crate::error::Result;

pub mod application;
pub mod engine;
pub mod types;

/// Static description of one message: its wire id and payload types.
pub trait Exchange: Send + 'static {
    const MESSAGE_TYPE: u32;
    const NAME: &'static str;
    type Args: WireStruct + Send;
    type Results: WireStruct + Send;
}

/// Decodes `(args, results)` sub-buffers into a set member.
pub type DecodeFn<N> = fn(&[u8], &[u8]) -> Result<N>;

/// Registry entry for one message type.
pub struct MessageSchema<N> {
    pub message_type: u32,
    pub name: &'static str,
    pub decode: DecodeFn<N>,
}

impl<N> fmt::Debug for MessageSchema<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSchema")
            .field("message_type", &self.message_type)
            .field("name", &self.name)
            .finish()
    }
}

/// A decoded message together with its (possibly edited) results.
pub trait MessageSet: Sized + Send {
    fn message_type(&self) -> u32;

    fn name(&self) -> &'static str;

    /// Encode the current results.
    fn encode_results(&self) -> Bytes;

    /// One schema per member, used to build a registry.
    fn schemas() -> Vec<MessageSchema<Self>>;
}

#[doc(hidden)]
#[macro_export]
macro_rules! __message_struct {
    ($name:ident { $($body:tt)* }) => {
        $crate::wire_struct! {
            pub struct $name { $($body)* }
        }
    };
    ($name:ident extern) => {};
}

/// Declare a message set.
///
/// ```text
/// message_set! {
///     pub enum Notification;
///     pub trait ApplicationCallbacks;
///
///     1 => DetectBegin / on_detect_begin {
///         args DetectBeginArgs { cached: bool, package_count: u32 }
///         results DetectBeginResults { cancel: bool }
///     }
/// }
/// ```
///
/// `args Name extern` (or `results Name extern`) refers to a struct that is
/// declared by hand instead of generated.
#[macro_export]
macro_rules! message_set {
    (
        $(#[$enum_meta:meta])*
        $vis:vis enum $set:ident;
        $(#[$trait_meta:meta])*
        $tvis:vis trait $callbacks:ident;
        $(
            $(#[$meta:meta])*
            $id:literal => $variant:ident / $method:ident {
                args $args:ident $args_body:tt
                results $results:ident $results_body:tt
            }
        )*
    ) => {
        $(
            $crate::__message_struct!($args $args_body);
            $crate::__message_struct!($results $results_body);

            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            $vis struct $variant;

            impl $crate::messages::Exchange for $variant {
                const MESSAGE_TYPE: u32 = $id;
                const NAME: &'static str = stringify!($variant);
                type Args = $args;
                type Results = $results;
            }
        )*

        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $set {
            $( $variant { args: $args, results: $results }, )*
        }

        impl $set {
            /// Hand this message to the matching callback method.
            pub fn deliver<C: $callbacks + ?Sized>(
                &mut self,
                callbacks: &mut C,
            ) -> $crate::error::Result<()> {
                match self {
                    $( Self::$variant { args, results } => callbacks.$method(args, results), )*
                }
            }
        }

        impl $crate::messages::MessageSet for $set {
            fn message_type(&self) -> u32 {
                match self {
                    $( Self::$variant { .. } => $id, )*
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant { .. } => stringify!($variant), )*
                }
            }

            fn encode_results(&self) -> $crate::bytes::Bytes {
                match self {
                    $( Self::$variant { results, .. } => $crate::codec::WireStruct::encode(results), )*
                }
            }

            fn schemas() -> ::std::vec::Vec<$crate::messages::MessageSchema<Self>> {
                ::std::vec![
                    $(
                        $crate::messages::MessageSchema {
                            message_type: $id,
                            name: stringify!($variant),
                            decode: |args: &[u8], results: &[u8]| -> $crate::error::Result<Self> {
                                Ok(Self::$variant {
                                    args: <$args as $crate::codec::WireStruct>::decode(args)?,
                                    results: <$results as $crate::codec::WireStruct>::decode(results)?,
                                })
                            },
                        },
                    )*
                ]
            }
        }

        $(#[$trait_meta])*
        $tvis trait $callbacks {
            $(
                $(#[$meta])*
                fn $method(
                    &mut self,
                    args: &$args,
                    results: &mut $results,
                ) -> $crate::error::Result<()> {
                    let _ = (args, results);
                    Ok(())
                }
            )*
        }

        impl<T: $callbacks + ?Sized> $callbacks for ::std::boxed::Box<T> {
            $(
                fn $method(
                    &mut self,
                    args: &$args,
                    results: &mut $results,
                ) -> $crate::error::Result<()> {
                    (**self).$method(args, results)
                }
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::API_VERSION;

    crate::message_set! {
        enum Sample;
        trait SampleCallbacks;

        /// Ping the peer.
        3 => Ping / on_ping {
            args PingArgs { text: Option<String> }
            results PingResults { echoed: Option<String>, count: u32 }
        }
        9 => Halt / on_halt {
            args HaltArgs {}
            results HaltResults {}
        }
    }

    #[derive(Default)]
    struct Echo {
        seen: u32,
    }

    impl SampleCallbacks for Echo {
        fn on_ping(&mut self, args: &PingArgs, results: &mut PingResults) -> Result<()> {
            self.seen += 1;
            results.echoed = args.text.clone();
            results.count = self.seen;
            Ok(())
        }
    }

    #[test]
    fn test_exchange_constants() {
        assert_eq!(Ping::MESSAGE_TYPE, 3);
        assert_eq!(Ping::NAME, "Ping");
        assert_eq!(Halt::MESSAGE_TYPE, 9);
    }

    #[test]
    fn test_schemas_decode_members() {
        let schemas = Sample::schemas();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].message_type, 3);

        let args = PingArgs {
            text: Some("hello".into()),
            ..Default::default()
        };
        let message = (schemas[0].decode)(&args.encode(), &PingResults::default().encode()).unwrap();

        assert_eq!(message.message_type(), 3);
        assert_eq!(message.name(), "Ping");
        assert!(matches!(
            &message,
            Sample::Ping { args, .. } if args.text.as_deref() == Some("hello")
        ));
    }

    #[test]
    fn test_deliver_reaches_callback() {
        let mut message = Sample::Ping {
            args: PingArgs {
                text: Some("x".into()),
                ..Default::default()
            },
            results: PingResults::default(),
        };

        let mut echo = Echo::default();
        message.deliver(&mut echo).unwrap();

        let results = PingResults::decode(&message.encode_results()).unwrap();
        assert_eq!(results.echoed.as_deref(), Some("x"));
        assert_eq!(results.count, 1);
        assert_eq!(results.version, API_VERSION);
    }

    #[test]
    fn test_default_callback_leaves_results() {
        let mut message = Sample::Halt {
            args: HaltArgs::default(),
            results: HaltResults::default(),
        };
        let mut boxed: Box<dyn SampleCallbacks> = Box::new(Echo::default());
        message.deliver(&mut boxed).unwrap();
        assert_eq!(message.encode_results().len(), 4);
    }
}
