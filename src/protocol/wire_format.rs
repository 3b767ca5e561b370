//! Wire format encoding and decoding.
//!
//! Implements the 8-byte frame header:
//! ```text
//! ┌──────────────┬──────────────┬─────────────────┐
//! │ Message type │ Length       │ Payload         │
//! │ 4 bytes      │ 4 bytes      │ Length bytes    │
//! │ uint32 LE    │ uint32 LE    │                 │
//! └──────────────┴──────────────┴─────────────────┘
//! ```
//!
//! All multi-byte integers are Little Endian.

use crate::error::{BawireError, Result};

/// Header size in bytes (fixed, exactly 8).
pub const HEADER_SIZE: usize = 8;

/// Default maximum payload size (64 MB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u32 = 64 * 1024 * 1024;

/// Absolute maximum payload size (~2 GB, max i32).
pub const ABSOLUTE_MAX_PAYLOAD_SIZE: u32 = 2_147_483_647;

/// Reserved message type. Never registered, so never handled.
pub const RESERVED_MESSAGE_TYPE: u32 = 0;

/// Message type used by the connection handshake.
pub const HANDSHAKE_MESSAGE_TYPE: u32 = 0xFFFF_FFF0;

/// Decoded header from wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Message type (operation or notification id).
    pub message_type: u32,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl Header {
    /// Create a new header.
    pub fn new(message_type: u32, payload_length: u32) -> Self {
        Self {
            message_type,
            payload_length,
        }
    }

    /// Encode header to bytes (Little Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use bawire::protocol::Header;
    ///
    /// let header = Header::new(3, 100);
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 8);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (8 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.message_type.to_le_bytes());
        buf[4..8].copy_from_slice(&self.payload_length.to_le_bytes());
    }

    /// Decode header from bytes (Little Endian).
    ///
    /// Returns `None` if buffer is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use bawire::protocol::Header;
    ///
    /// let bytes = [3, 0, 0, 0, 100, 0, 0, 0];
    /// let header = Header::decode(&bytes).unwrap();
    /// assert_eq!(header.message_type, 3);
    /// assert_eq!(header.payload_length, 100);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            message_type: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            payload_length: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    /// Validate the header for protocol compliance.
    ///
    /// Only the payload length is checked. Type 0 is a valid frame: no
    /// handler is ever registered for it, so it is answered like any other
    /// unknown message type.
    pub fn validate(&self, max_payload_size: u32) -> Result<()> {
        if self.payload_length > max_payload_size {
            return Err(BawireError::Protocol(format!(
                "Payload size {} exceeds maximum {}",
                self.payload_length, max_payload_size
            )));
        }

        Ok(())
    }

    /// Check if this is the handshake message.
    #[inline]
    pub fn is_handshake(&self) -> bool {
        self.message_type == HANDSHAKE_MESSAGE_TYPE
    }
}
