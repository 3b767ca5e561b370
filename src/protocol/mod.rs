//! Protocol module - wire format, framing, and payload layouts.
//!
//! - 8-byte header encoding/decoding
//! - Frame buffer for accumulating partial reads
//! - Request/reply payload split and join

mod frame;
mod frame_buffer;
mod payload;
mod wire_format;

pub use frame::{build_frame, Message};
pub use frame_buffer::FrameBuffer;
pub use payload::{decode_reply, decode_request, encode_reply, encode_request};
pub use wire_format::{
    Header, ABSOLUTE_MAX_PAYLOAD_SIZE, DEFAULT_MAX_PAYLOAD_SIZE, HANDSHAKE_MESSAGE_TYPE,
    HEADER_SIZE, RESERVED_MESSAGE_TYPE,
};
