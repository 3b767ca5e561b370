//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented frames:
//! - `WaitingForHeader`: Need at least 8 bytes
//! - `WaitingForPayload`: Header parsed, need N more payload bytes
//!
//! # Example
//!
//! ```
//! use bawire::protocol::{build_frame, FrameBuffer};
//!
//! let mut buffer = FrameBuffer::new();
//! let frame = build_frame(3, b"abc");
//!
//! // Data arrives in chunks from the pipe
//! assert!(buffer.push(&frame[..5]).unwrap().is_empty());
//! let messages = buffer.push(&frame[5..]).unwrap();
//! assert_eq!(messages[0].message_type, 3);
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::{Header, ABSOLUTE_MAX_PAYLOAD_SIZE, DEFAULT_MAX_PAYLOAD_SIZE, HEADER_SIZE};
use super::Message;
use crate::error::{BawireError, Result};

/// State machine for frame parsing.
#[derive(Debug, Clone)]
enum State {
    /// Waiting for complete header (need 8 bytes).
    WaitingForHeader,
    /// Header parsed, waiting for payload bytes.
    WaitingForPayload { header: Header },
}

/// Buffer for accumulating incoming bytes and extracting complete messages.
///
/// All data is stored in a single `BytesMut` buffer to minimize allocations.
#[derive(Debug)]
pub struct FrameBuffer {
    buffer: BytesMut,
    state: State,
    max_payload_size: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 64KB, max payload: 64MB.
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD_SIZE)
    }

    /// Create a new frame buffer with custom max payload size.
    ///
    /// The size is capped at [`ABSOLUTE_MAX_PAYLOAD_SIZE`].
    pub fn with_max_payload(max_payload_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::WaitingForHeader,
            max_payload_size: max_payload_size.min(ABSOLUTE_MAX_PAYLOAD_SIZE),
        }
    }

    /// Push data into the buffer and extract all complete messages.
    ///
    /// If data is fragmented, partial data is buffered internally for the
    /// next push.
    ///
    /// # Errors
    ///
    /// Returns error if a header declares a payload larger than the
    /// configured maximum.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Message>> {
        self.buffer.extend_from_slice(data);

        let mut messages = Vec::new();
        while let Some(message) = self.try_extract_one()? {
            messages.push(message);
        }
        Ok(messages)
    }

    fn try_extract_one(&mut self) -> Result<Option<Message>> {
        match self.state {
            State::WaitingForHeader => {
                if self.buffer.len() < HEADER_SIZE {
                    return Ok(None);
                }

                let header = Header::decode(&self.buffer[..HEADER_SIZE]).ok_or_else(|| {
                    BawireError::Protocol("Short frame header".to_string())
                })?;
                header.validate(self.max_payload_size)?;

                let _ = self.buffer.split_to(HEADER_SIZE);

                if header.payload_length == 0 {
                    return Ok(Some(Message::new(header.message_type, Bytes::new())));
                }

                self.state = State::WaitingForPayload { header };
                self.try_extract_one()
            }

            State::WaitingForPayload { header } => {
                let remaining = header.payload_length as usize;
                if self.buffer.len() < remaining {
                    return Ok(None);
                }

                let payload = self.buffer.split_to(remaining).freeze();
                self.state = State::WaitingForHeader;

                Ok(Some(Message::new(header.message_type, payload)))
            }
        }
    }

    /// Check if a frame has started but not finished arriving.
    ///
    /// A stream that ends while this is `true` was truncated mid-frame.
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty() || matches!(self.state, State::WaitingForPayload { .. })
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::build_frame;

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = FrameBuffer::new();
        let messages = buffer.push(&build_frame(1, b"hello")).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, 1);
        assert_eq!(messages[0].payload(), b"hello");
        assert!(buffer.is_empty());
        assert!(!buffer.has_partial());
    }

    #[test]
    fn test_multiple_frames_in_one_push() {
        let mut buffer = FrameBuffer::new();

        let mut combined = build_frame(1, b"first");
        combined.extend_from_slice(&build_frame(2, b"second"));
        combined.extend_from_slice(&build_frame(3, b"third"));

        let messages = buffer.push(&combined).unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].message_type, 1);
        assert_eq!(messages[1].message_type, 2);
        assert_eq!(messages[2].message_type, 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fragmented_header() {
        let mut buffer = FrameBuffer::new();
        let frame = build_frame(1, b"test");

        assert!(buffer.push(&frame[..5]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForHeader");
        assert!(buffer.has_partial());

        let messages = buffer.push(&frame[5..]).unwrap();
        assert_eq!(messages.len(), 1);
        assert!(!buffer.has_partial());
    }

    #[test]
    fn test_fragmented_payload() {
        let mut buffer = FrameBuffer::new();
        let payload = b"this is a longer payload that will be fragmented";
        let frame = build_frame(1, payload);

        let partial_len = HEADER_SIZE + 10;
        assert!(buffer.push(&frame[..partial_len]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForPayload");
        assert!(buffer.has_partial());

        let messages = buffer.push(&frame[partial_len..]).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].payload(), payload);
    }

    #[test]
    fn test_header_only_waiting_for_payload_is_partial() {
        let mut buffer = FrameBuffer::new();
        let frame = build_frame(9, b"xyz");

        buffer.push(&frame[..HEADER_SIZE]).unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.has_partial());
    }

    #[test]
    fn test_empty_payload() {
        let mut buffer = FrameBuffer::new();
        let messages = buffer.push(&build_frame(4, b"")).unwrap();

        assert_eq!(messages.len(), 1);
        assert!(messages[0].payload.is_empty());
    }

    #[test]
    fn test_max_payload_validation() {
        let mut buffer = FrameBuffer::with_max_payload(100);
        let header = Header::new(1, 1000);

        let result = buffer.push(&header.encode());
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_header_over_absolute_max_rejected() {
        let mut buffer = FrameBuffer::with_max_payload(u32::MAX);
        let header = Header::new(1, ABSOLUTE_MAX_PAYLOAD_SIZE + 1);

        let result = buffer.push(&header.encode());
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_reserved_type_passes_through() {
        let mut buffer = FrameBuffer::new();
        let mut data = Header::new(0, 4).encode().to_vec();
        data.extend_from_slice(&[1, 0, 0, 0]);

        let messages = buffer.push(&data).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, 0);
        assert_eq!(&messages[0].payload[..], &[1, 0, 0, 0]);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut buffer = FrameBuffer::new();
        let frame = build_frame(1, b"test");

        buffer.push(&frame[..HEADER_SIZE]).unwrap();
        assert_eq!(buffer.state_name(), "WaitingForPayload");

        buffer.clear();

        assert_eq!(buffer.state_name(), "WaitingForHeader");
        assert!(!buffer.has_partial());
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = FrameBuffer::new();
        let frame = build_frame(1, b"hi");

        let mut all = Vec::new();
        for byte in &frame {
            all.extend(buffer.push(&[*byte]).unwrap());
        }

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].payload(), b"hi");
    }
}
