//! Length-prefixed primitive and string encoding.
//!
//! ```text
//! u32 / u64      little-endian
//! string         [count: u32][count x UTF-16 unit, little-endian]
//! absent string  [0xFFFF_FFFF]
//! ```
//!
//! # Example
//!
//! ```
//! use bawire::codec::{BufferReader, BufferWriter};
//!
//! let mut writer = BufferWriter::new();
//! writer.write_u32(7);
//! writer.write_string(Some("hi"));
//! writer.write_string(None);
//!
//! let bytes = writer.freeze();
//! let mut reader = BufferReader::new(&bytes);
//! assert_eq!(reader.read_u32().unwrap(), 7);
//! assert_eq!(reader.read_string().unwrap().as_deref(), Some("hi"));
//! assert_eq!(reader.read_string().unwrap(), None);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{BawireError, Result};

/// Count value that marks an absent string.
pub const ABSENT_STRING: u32 = u32::MAX;

/// Growable output buffer.
#[derive(Debug, Default, Clone)]
pub struct BufferWriter {
    buf: BytesMut,
}

impl BufferWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    /// Booleans travel as a u32 0/1.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.write_u32(u32::from(value));
    }

    /// Write a string as UTF-16 code units, or the absent marker for `None`.
    pub fn write_string(&mut self, value: Option<&str>) {
        match value {
            None => self.write_u32(ABSENT_STRING),
            Some(s) => {
                let count = s.encode_utf16().count();
                debug_assert!((count as u64) < u64::from(ABSENT_STRING));
                self.write_u32(count as u32);
                self.buf.reserve(count * 2);
                for unit in s.encode_utf16() {
                    self.buf.put_u16_le(unit);
                }
            }
        }
    }

    /// Write a length-prefixed byte block.
    pub fn write_block(&mut self, data: &[u8]) {
        self.write_u32(data.len() as u32);
        self.buf.extend_from_slice(data);
    }

    /// Append raw bytes with no prefix.
    pub fn write_raw(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish writing and return the bytes.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Cursor over an input buffer.
#[derive(Debug, Clone)]
pub struct BufferReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BufferReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check if the cursor reached the end.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(BawireError::BufferUnderrun {
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    /// Any non-zero value reads as `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u32()? != 0)
    }

    /// Read a string; the absent marker reads as `None`.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let count = self.read_u32()?;
        if count == ABSENT_STRING {
            return Ok(None);
        }

        let byte_len = (count as usize).checked_mul(2).ok_or_else(|| {
            BawireError::Protocol(format!("String length {} overflows", count))
        })?;
        let raw = self.take(byte_len)?;

        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        String::from_utf16(&units)
            .map(Some)
            .map_err(|e| BawireError::Protocol(format!("Invalid UTF-16 string: {}", e)))
    }

    /// Read a length-prefixed byte block (zero-copy).
    pub fn read_block(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    /// Everything after the cursor, consuming it.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

/// Concatenate two encoded buffers.
pub fn concat(a: &[u8], b: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(a.len() + b.len());
    buf.extend_from_slice(a);
    buf.extend_from_slice(b);
    buf.freeze()
}
