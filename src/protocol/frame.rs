//! Message struct and frame building.
//!
//! A [`Message`] is one decoded frame: the message type and its payload.
//! Uses `bytes::Bytes` for zero-copy payload sharing.
//!
//! # Example
//!
//! ```
//! use bawire::protocol::{build_frame, Message};
//! use bytes::Bytes;
//!
//! let message = Message::new(5, Bytes::from_static(b"hello"));
//! let frame = build_frame(message.message_type, message.payload());
//! assert_eq!(frame.len(), 8 + 5);
//! ```

use bytes::Bytes;

use super::wire_format::{Header, HEADER_SIZE};

/// A complete message as it travels in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Operation or notification id.
    pub message_type: u32,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
}

impl Message {
    /// Create a new message.
    pub fn new(message_type: u32, payload: Bytes) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    /// Create a message from raw bytes (copies data).
    pub fn from_parts(message_type: u32, payload: &[u8]) -> Self {
        Self::new(message_type, Bytes::copy_from_slice(payload))
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Header describing this message.
    #[inline]
    pub fn header(&self) -> Header {
        Header::new(self.message_type, self.payload.len() as u32)
    }
}

/// Build a complete frame as a single byte vector.
///
/// Encodes header and appends payload into a contiguous buffer.
pub fn build_frame(message_type: u32, payload: &[u8]) -> Vec<u8> {
    let header = Header::new(message_type, payload.len() as u32);
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let message = Message::new(7, Bytes::from_static(b"hello"));
        assert_eq!(message.message_type, 7);
        assert_eq!(message.payload(), b"hello");
        assert_eq!(message.payload_len(), 5);
        assert_eq!(message.header(), Header::new(7, 5));
    }

    #[test]
    fn test_message_from_parts() {
        let message = Message::from_parts(2, b"test");
        assert_eq!(message.payload(), b"test");
    }

    #[test]
    fn test_build_frame() {
        let bytes = build_frame(1, b"hello");
        assert_eq!(bytes.len(), HEADER_SIZE + 5);

        let parsed = Header::decode(&bytes[..HEADER_SIZE]).unwrap();
        assert_eq!(parsed, Header::new(1, 5));
        assert_eq!(&bytes[HEADER_SIZE..], b"hello");
    }

    #[test]
    fn test_build_frame_empty_payload() {
        assert_eq!(build_frame(1, b"").len(), HEADER_SIZE);
    }

    #[test]
    fn test_build_frame_roundtrip() {
        use super::super::FrameBuffer;

        let bytes = build_frame(123, b"0123456789");
        let mut buffer = FrameBuffer::new();
        let messages = buffer.push(&bytes).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, 123);
        assert_eq!(messages[0].payload(), b"0123456789");
    }
}
