//! Request and reply payload layouts.
//!
//! ```text
//! request  [argsLen: u32][args][resultsLen: u32][results skeleton]
//! reply    [status: u32][resultsLen: u32][results]
//! ```
//!
//! Both sides of an exchange use the same message type; the direction is
//! implied by who is waiting.

use bytes::Bytes;

use crate::codec::{BufferReader, BufferWriter};
use crate::error::Result;
use crate::status::Status;

/// Join encoded args and a results skeleton into a request payload.
pub fn encode_request(args: &[u8], results: &[u8]) -> Bytes {
    let mut writer = BufferWriter::with_capacity(8 + args.len() + results.len());
    writer.write_block(args);
    writer.write_block(results);
    writer.freeze()
}

/// Split a request payload into `(args, results skeleton)`.
pub fn decode_request(payload: &[u8]) -> Result<(&[u8], &[u8])> {
    let mut reader = BufferReader::new(payload);
    let args = reader.read_block()?;
    let results = reader.read_block()?;
    Ok((args, results))
}

/// Build a reply payload from a status and encoded results.
pub fn encode_reply(status: Status, results: &[u8]) -> Bytes {
    let mut writer = BufferWriter::with_capacity(8 + results.len());
    writer.write_u32(status.0);
    writer.write_block(results);
    writer.freeze()
}

/// Split a reply payload into `(status, results)`.
pub fn decode_reply(payload: &[u8]) -> Result<(Status, &[u8])> {
    let mut reader = BufferReader::new(payload);
    let status = Status(reader.read_u32()?);
    let results = reader.read_block()?;
    Ok((status, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BawireError;

    #[test]
    fn test_request_layout() {
        let payload = encode_request(b"ab", b"xyz");
        assert_eq!(&payload[..4], &2u32.to_le_bytes());
        assert_eq!(&payload[4..6], b"ab");
        assert_eq!(&payload[6..10], &3u32.to_le_bytes());

        let (args, results) = decode_request(&payload).unwrap();
        assert_eq!(args, b"ab");
        assert_eq!(results, b"xyz");
    }

    #[test]
    fn test_reply_layout() {
        let payload = encode_reply(Status::MORE_DATA, b"r");
        let (status, results) = decode_reply(&payload).unwrap();
        assert_eq!(status, Status::MORE_DATA);
        assert_eq!(results, b"r");
    }

    #[test]
    fn test_truncated_request_underruns() {
        let payload = encode_request(b"args", b"results");
        let result = decode_request(&payload[..payload.len() - 1]);
        assert!(matches!(result, Err(BawireError::BufferUnderrun { .. })));
    }
}
