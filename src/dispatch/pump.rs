//! Receive loop and reply rules.
//!
//! [`serve`] is shared by the BA-side [`Dispatcher`] and the engine-side
//! request server: receive, split, decode, resolve, reply. Every request gets
//! exactly one reply, even when it cannot be decoded.
//!
//! | outcome            | status             | results                       |
//! |--------------------|--------------------|-------------------------------|
//! | `Ok`               | success            | full results                  |
//! | `NotImplemented`   | success            | the skeleton as received      |
//! | `MoreData`         | more-data          | full results                  |
//! | any other error    | the error's status | version only                  |

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use super::application::BootstrapperApplication;
use super::registry::SchemaRegistry;
use super::resolver::{OverrideHook, Outcome, Resolver, ResolverChain};
use crate::channel::PipeChannel;
use crate::codec::{encode_version_only, BufferReader, API_VERSION};
use crate::error::{BawireError, Result};
use crate::messages::application::Notification;
use crate::messages::MessageSet;
use crate::protocol::{decode_request, encode_reply, Message};
use crate::status::Status;

/// Version to stamp on a minimal reply: the skeleton's, if it has one.
fn results_version(skeleton: &[u8]) -> u32 {
    BufferReader::new(skeleton)
        .read_u32()
        .unwrap_or(API_VERSION)
}

/// Build the reply payload for a resolved message.
pub(crate) fn build_reply<N: MessageSet>(message: &N, skeleton: &[u8], outcome: &Outcome) -> Bytes {
    match outcome {
        Ok(()) => encode_reply(Status::OK, &message.encode_results()),
        Err(BawireError::NotImplemented) => encode_reply(Status::OK, skeleton),
        Err(BawireError::MoreData { .. }) => {
            encode_reply(Status::MORE_DATA, &message.encode_results())
        }
        Err(e) => encode_reply(
            e.status(),
            &encode_version_only(results_version(skeleton)),
        ),
    }
}

/// Reply to one request that could not be decoded, then hand back the error.
async fn reply_minimal<S>(
    channel: &mut PipeChannel<S>,
    message_type: u32,
    skeleton: &[u8],
    err: BawireError,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tracing::error!(message_type, "failed to decode message: {}", err);
    let reply = encode_reply(err.status(), &encode_version_only(results_version(skeleton)));
    if let Err(send_err) = channel.send_message(message_type, &reply).await {
        tracing::warn!(message_type, "minimal reply not sent: {}", send_err);
    }
    Err(err)
}

/// Handle one received request and send its reply.
pub(crate) async fn serve_one<S, N, F>(
    channel: &mut PipeChannel<S>,
    registry: &SchemaRegistry<N>,
    message: &Message,
    resolve: &mut F,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    N: MessageSet,
    F: FnMut(&mut N) -> Outcome,
{
    let message_type = message.message_type;

    let (args, skeleton) = match decode_request(&message.payload) {
        Ok(parts) => parts,
        Err(e) => return reply_minimal(channel, message_type, &[], e).await,
    };

    let schema = match registry.get(message_type) {
        Some(schema) => schema,
        None => {
            tracing::warn!(message_type, "unknown message type");
            let reply = encode_reply(
                Status::OK,
                &encode_version_only(results_version(skeleton)),
            );
            return channel.send_message(message_type, &reply).await;
        }
    };

    let mut decoded = match (schema.decode)(args, skeleton) {
        Ok(decoded) => decoded,
        Err(e) => return reply_minimal(channel, message_type, skeleton, e).await,
    };

    let outcome = resolve(&mut decoded);
    match &outcome {
        Ok(()) => tracing::trace!(name = schema.name, "handled"),
        Err(e) if e.is_not_implemented() => {
            tracing::debug!(name = schema.name, "not implemented, echoing skeleton")
        }
        Err(e) => tracing::debug!(name = schema.name, "handler failed: {}", e),
    }

    let reply = build_reply(&decoded, skeleton, &outcome);
    channel.send_message(message_type, &reply).await
}

/// Serve requests until the peer closes the channel.
///
/// End-of-stream is a clean exit. Decode and transport errors end the loop.
pub(crate) async fn serve<S, N, F>(
    channel: &mut PipeChannel<S>,
    registry: &SchemaRegistry<N>,
    mut resolve: F,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    N: MessageSet,
    F: FnMut(&mut N) -> Outcome,
{
    loop {
        let message = match channel.receive_message().await? {
            Some(message) => message,
            None => {
                tracing::debug!("peer closed, pump exiting");
                return Ok(());
            }
        };

        serve_one(channel, registry, &message, &mut resolve).await?;
    }
}

/// BA-side message pump.
///
/// Owns the notification channel and the application, and answers every
/// notification through the [`ResolverChain`].
///
/// # Example
///
/// ```no_run
/// # async fn run(channel: bawire::channel::PipeChannel<bawire::transport::PipeStream>) -> bawire::error::Result<()> {
/// use bawire::dispatch::{BootstrapperApplication, Dispatcher};
/// use bawire::messages::application::ApplicationCallbacks;
///
/// struct Quiet;
/// impl ApplicationCallbacks for Quiet {}
/// impl BootstrapperApplication for Quiet {}
///
/// let mut dispatcher = Dispatcher::new(channel, Quiet);
/// dispatcher.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher<S, A: BootstrapperApplication> {
    channel: PipeChannel<S>,
    app: A,
    chain: ResolverChain<A>,
    registry: SchemaRegistry<Notification>,
}

impl<S, A> Dispatcher<S, A>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    A: BootstrapperApplication,
{
    /// Create a dispatcher with the default chain and every notification
    /// registered.
    pub fn new(channel: PipeChannel<S>, app: A) -> Self {
        Self {
            channel,
            app,
            chain: ResolverChain::new(),
            registry: SchemaRegistry::new(),
        }
    }

    /// Add a resolver ahead of the per-message tier.
    pub fn with_resolver<R: Resolver<A> + 'static>(mut self, resolver: R) -> Self {
        self.chain.insert(resolver);
        self
    }

    /// Replace the override hook.
    pub fn with_override<H: OverrideHook<A> + 'static>(mut self, hook: H) -> Self {
        self.chain.set_override(hook);
        self
    }

    pub fn application(&self) -> &A {
        &self.app
    }

    pub fn application_mut(&mut self) -> &mut A {
        &mut self.app
    }

    /// Registry used to decode notifications.
    pub fn registry_mut(&mut self) -> &mut SchemaRegistry<Notification> {
        &mut self.registry
    }

    /// Run the pump until the engine closes the channel.
    pub async fn run(&mut self) -> Result<()> {
        let Self {
            channel,
            app,
            chain,
            registry,
        } = self;

        serve(channel, registry, |notification| {
            chain.resolve(app, notification)
        })
        .await
    }

    /// Handle one already-received message.
    pub async fn dispatch(&mut self, message: &Message) -> Result<()> {
        let Self {
            channel,
            app,
            chain,
            registry,
        } = self;

        serve_one(channel, registry, message, &mut |notification: &mut Notification| {
            chain.resolve(app, notification)
        })
        .await
    }

    /// Take the channel and application back.
    pub fn into_parts(self) -> (PipeChannel<S>, A) {
        (self.channel, self.app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WireStruct;
    use crate::messages::application::*;
    use crate::protocol::{decode_reply, encode_request};
    use tokio::io::{duplex, DuplexStream};

    #[derive(Default)]
    struct Cancelling;

    impl ApplicationCallbacks for Cancelling {
        fn on_progress(&mut self, args: &ProgressArgs, results: &mut ProgressResults) -> Result<()> {
            results.cancel = args.overall_percentage >= 50;
            Ok(())
        }

        fn on_apply_begin(&mut self, _args: &ApplyBeginArgs, _results: &mut ApplyBeginResults) -> Result<()> {
            Err(BawireError::Failure(Status::FAIL))
        }

        fn on_plan_begin(&mut self, _args: &PlanBeginArgs, results: &mut PlanBeginResults) -> Result<()> {
            results.cancel = true;
            Err(BawireError::NotImplemented)
        }
    }

    impl BootstrapperApplication for Cancelling {}

    fn setup() -> (Dispatcher<DuplexStream, Cancelling>, PipeChannel<DuplexStream>) {
        let (a, b) = duplex(8192);
        (
            Dispatcher::new(PipeChannel::new(a), Cancelling),
            PipeChannel::new(b),
        )
    }

    fn request<A: WireStruct, R: WireStruct>(args: &A, results: &R) -> Bytes {
        encode_request(&args.encode(), &results.encode())
    }

    #[tokio::test]
    async fn test_handled_reply_carries_results() {
        let (mut dispatcher, mut engine) = setup();
        let pump = tokio::spawn(async move { dispatcher.run().await });

        let args = ProgressArgs {
            progress_percentage: 10,
            overall_percentage: 75,
            ..Default::default()
        };
        let reply = engine
            .call(24, &request(&args, &ProgressResults::default()))
            .await
            .unwrap();

        let (status, results) = decode_reply(&reply).unwrap();
        assert_eq!(status, Status::OK);
        assert!(ProgressResults::decode(results).unwrap().cancel);

        engine.close().await;
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failed_handler_gets_version_only_reply() {
        let (mut dispatcher, mut engine) = setup();
        let pump = tokio::spawn(async move { dispatcher.run().await });

        let reply = engine
            .call(
                21,
                &request(&ApplyBeginArgs::default(), &ApplyBeginResults::default()),
            )
            .await
            .unwrap();

        let (status, results) = decode_reply(&reply).unwrap();
        assert_eq!(status, Status::FAIL);
        assert_eq!(results, &API_VERSION.to_le_bytes());

        engine.close().await;
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_not_implemented_echoes_skeleton() {
        let (mut dispatcher, mut engine) = setup();
        let pump = tokio::spawn(async move { dispatcher.run().await });

        let skeleton = PlanBeginResults::default();
        let reply = engine
            .call(3, &request(&PlanBeginArgs::default(), &skeleton))
            .await
            .unwrap();

        let (status, results) = decode_reply(&reply).unwrap();
        assert_eq!(status, Status::OK);
        assert!(!PlanBeginResults::decode(results).unwrap().cancel);

        engine.close().await;
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_unknown_type_still_replied() {
        let (mut dispatcher, mut engine) = setup();
        let pump = tokio::spawn(async move { dispatcher.run().await });

        let version_only = encode_version_only(API_VERSION);
        let reply = engine
            .call(500, &encode_request(&version_only, &version_only))
            .await
            .unwrap();

        let (status, results) = decode_reply(&reply).unwrap();
        assert_eq!(status, Status::OK);
        assert_eq!(results, &API_VERSION.to_le_bytes());

        engine.close().await;
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_reserved_type_replied_and_pump_continues() {
        let (mut dispatcher, mut engine) = setup();
        let pump = tokio::spawn(async move { dispatcher.run().await });

        let version_only = encode_version_only(API_VERSION);
        let reply = engine
            .call(0, &encode_request(&version_only, &version_only))
            .await
            .unwrap();

        let (status, results) = decode_reply(&reply).unwrap();
        assert_eq!(status, Status::OK);
        assert_eq!(results, &API_VERSION.to_le_bytes());

        let args = ProgressArgs {
            overall_percentage: 80,
            ..Default::default()
        };
        let reply = engine
            .call(24, &request(&args, &ProgressResults::default()))
            .await
            .unwrap();
        let (status, results) = decode_reply(&reply).unwrap();
        assert_eq!(status, Status::OK);
        assert!(ProgressResults::decode(results).unwrap().cancel);

        engine.close().await;
        pump.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_undecodable_payload_replies_then_fails() {
        let (mut dispatcher, mut engine) = setup();
        let pump = tokio::spawn(async move { dispatcher.run().await });

        let reply = engine.call(24, &[1, 0]).await.unwrap();
        let (status, results) = decode_reply(&reply).unwrap();
        assert_eq!(status, Status::INVALID_DATA);
        assert_eq!(results.len(), 4);

        let result = pump.await.unwrap();
        assert!(matches!(result, Err(BawireError::BufferUnderrun { .. })));
    }

    #[tokio::test]
    async fn test_dispatch_single_message() {
        let (mut dispatcher, mut engine) = setup();

        let message = Message::new(
            5,
            request(&StartupArgs::default(), &StartupResults::default()),
        );
        dispatcher.dispatch(&message).await.unwrap();

        let reply = engine.receive_message().await.unwrap().unwrap();
        assert_eq!(reply.message_type, 5);
        let (status, _) = decode_reply(&reply.payload).unwrap();
        assert_eq!(status, Status::OK);
    }

    #[test]
    fn test_more_data_reply_keeps_results() {
        let message = Notification::Progress {
            args: ProgressArgs::default(),
            results: ProgressResults {
                cancel: true,
                ..Default::default()
            },
        };
        let skeleton = ProgressResults::default().encode();
        let reply = build_reply(&message, &skeleton, &Err(BawireError::MoreData { required: 9 }));

        let (status, results) = decode_reply(&reply).unwrap();
        assert_eq!(status, Status::MORE_DATA);
        assert!(ProgressResults::decode(results).unwrap().cancel);
    }
}
