//! Codec module - the byte-buffer format shared by every message.
//!
//! - [`BufferWriter`] / [`BufferReader`] - primitives and length-prefixed strings
//! - [`WireValue`] - one field on the wire
//! - [`WireStruct`] - a version-tagged args or results struct
//!
//! Structs and enums are declared with the [`wire_struct!`](crate::wire_struct)
//! and [`wire_enum!`](crate::wire_enum) macros so each message only spells out
//! its field list.

mod buffer;
mod value;

pub use buffer::{concat, BufferReader, BufferWriter, ABSENT_STRING};
pub use value::{encode_version_only, WireStruct, WireValue, API_VERSION};
