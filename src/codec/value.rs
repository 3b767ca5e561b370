//! Typed field values and versioned structs.
//!
//! Every args/results struct on the wire starts with a `u32` schema version.
//! Structs are declared with [`wire_struct!`](crate::wire_struct), which
//! generates the encoder and a version-tolerant decoder:
//!
//! - fields are read in declaration order;
//! - if the buffer ends exactly on a field boundary, the remaining fields keep
//!   their defaults (the peer speaks an older schema);
//! - bytes left over after the last known field are ignored (newer schema).
//!
//! # Example
//!
//! ```
//! use bawire::codec::WireStruct;
//!
//! bawire::wire_struct! {
//!     pub struct Greeting {
//!         text: Option<String>,
//!         count: u32,
//!     }
//! }
//!
//! let greeting = Greeting { text: Some("hello".into()), count: 2, ..Default::default() };
//! let decoded = Greeting::decode(&greeting.encode()).unwrap();
//! assert_eq!(decoded, greeting);
//! ```

use bytes::Bytes;

use super::buffer::{BufferReader, BufferWriter};
use crate::error::Result;
use crate::status::Status;

/// Schema version written by this crate.
pub const API_VERSION: u32 = 1;

/// A single field that knows how to put itself on the wire.
pub trait WireValue: Sized {
    fn write_to(&self, writer: &mut BufferWriter);
    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self>;
}

impl WireValue for u32 {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_u32(*self);
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        reader.read_u32()
    }
}

impl WireValue for u64 {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_u64(*self);
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        reader.read_u64()
    }
}

impl WireValue for i32 {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_i32(*self);
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        reader.read_i32()
    }
}

impl WireValue for i64 {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_i64(*self);
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        reader.read_i64()
    }
}

impl WireValue for bool {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_bool(*self);
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        reader.read_bool()
    }
}

impl WireValue for Option<String> {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_string(self.as_deref());
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        reader.read_string()
    }
}

/// Always written as present; an absent string on input reads as empty.
impl WireValue for String {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_string(Some(self));
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        Ok(reader.read_string()?.unwrap_or_default())
    }
}

impl WireValue for Status {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_u32(self.0);
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        Ok(Status(reader.read_u32()?))
    }
}

/// `[count: u32]` followed by `count` strings.
impl WireValue for Vec<String> {
    fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_u32(self.len() as u32);
        for item in self {
            writer.write_string(Some(item));
        }
    }

    fn read_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        let count = reader.read_u32()? as usize;
        // Each entry needs at least its 4-byte count.
        let mut items = Vec::with_capacity(count.min(reader.remaining() / 4));
        for _ in 0..count {
            items.push(String::read_from(reader)?);
        }
        Ok(items)
    }
}

/// A version-tagged args or results struct.
pub trait WireStruct: Sized + Default {
    /// Schema version carried by this value.
    fn version(&self) -> u32;

    fn encode_into(&self, writer: &mut BufferWriter);

    fn decode_from(reader: &mut BufferReader<'_>) -> Result<Self>;

    fn encode(&self) -> Bytes {
        let mut writer = BufferWriter::new();
        self.encode_into(&mut writer);
        writer.freeze()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_from(&mut BufferReader::new(bytes))
    }
}

/// The smallest valid struct encoding: a version field and nothing else.
pub fn encode_version_only(version: u32) -> Bytes {
    let mut writer = BufferWriter::with_capacity(4);
    writer.write_u32(version);
    writer.freeze()
}

/// Declare a versioned wire struct.
///
/// The struct gets a leading `pub version: u32` field, a `Default` impl that
/// stamps [`API_VERSION`], and a [`WireStruct`] impl.
#[macro_export]
macro_rules! wire_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis struct $name {
            /// Schema version.
            pub version: u32,
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self {
                    version: $crate::codec::API_VERSION,
                    $( $field: ::std::default::Default::default(), )*
                }
            }
        }

        impl $crate::codec::WireStruct for $name {
            fn version(&self) -> u32 {
                self.version
            }

            fn encode_into(&self, writer: &mut $crate::codec::BufferWriter) {
                writer.write_u32(self.version);
                $( $crate::codec::WireValue::write_to(&self.$field, writer); )*
            }

            #[allow(unused_mut)]
            fn decode_from(
                reader: &mut $crate::codec::BufferReader<'_>,
            ) -> $crate::error::Result<Self> {
                let mut value = <Self as ::std::default::Default>::default();
                value.version = reader.read_u32()?;
                $(
                    if reader.is_empty() {
                        return Ok(value);
                    }
                    value.$field = $crate::codec::WireValue::read_from(reader)?;
                )*
                Ok(value)
            }
        }
    };
}

/// Declare a `u32`-backed enum that crosses the wire.
///
/// The first variant is the default. Unknown discriminants are protocol errors.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$first_meta:meta])* $first:ident = $first_value:literal
            $(, $(#[$vmeta:meta])* $variant:ident = $value:literal )* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        $vis enum $name {
            $(#[$first_meta])* $first = $first_value,
            $( $(#[$vmeta])* $variant = $value, )*
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::$first
            }
        }

        impl ::std::convert::TryFrom<u32> for $name {
            type Error = $crate::error::BawireError;

            fn try_from(value: u32) -> ::std::result::Result<Self, $crate::error::BawireError> {
                match value {
                    $first_value => Ok(Self::$first),
                    $( $value => Ok(Self::$variant), )*
                    other => Err($crate::error::BawireError::Protocol(format!(
                        "Invalid {} value {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl $crate::codec::WireValue for $name {
            fn write_to(&self, writer: &mut $crate::codec::BufferWriter) {
                writer.write_u32(*self as u32);
            }

            fn read_from(
                reader: &mut $crate::codec::BufferReader<'_>,
            ) -> $crate::error::Result<Self> {
                Self::try_from(reader.read_u32()?)
            }
        }
    };
}
