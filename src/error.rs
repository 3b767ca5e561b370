//! Error types for bawire.

use thiserror::Error;

use crate::status::Status;

/// Main error type for all bawire operations.
#[derive(Debug, Error)]
pub enum BawireError {
    /// A caller-supplied argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller's buffer is too small; `required` counts UTF-16 units
    /// including the terminator.
    #[error("More data available: {required} characters required")]
    MoreData { required: u32 },

    /// The requested item does not exist.
    #[error("Not found")]
    NotFound,

    /// A read ran past the end of a buffer.
    #[error("Buffer underrun: needed {needed} bytes, {available} available")]
    BufferUnderrun { needed: usize, available: usize },

    /// Protocol error (malformed frame, unexpected reply, bad enum value, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O error on the underlying pipe/socket.
    #[error("Transport failure: {0}")]
    Transport(#[from] std::io::Error),

    /// The channel is closed, or the peer went away while a reply was pending.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Internal fall-through sentinel. Never sent to the peer as-is.
    #[error("Not implemented")]
    NotImplemented,

    /// Arbitrary failure status, usually reported by the peer.
    #[error("Failure: status {0}")]
    Failure(Status),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl BawireError {
    /// Status code used when this error has to be reported across the pipe.
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidArgument(_) => Status::INVALID_ARGUMENT,
            Self::MoreData { .. } => Status::MORE_DATA,
            Self::NotFound => Status::NOT_FOUND,
            Self::BufferUnderrun { .. } | Self::Protocol(_) => Status::INVALID_DATA,
            Self::Transport(_) | Self::ConnectionClosed => Status::BROKEN_PIPE,
            Self::NotImplemented => Status::NOT_IMPLEMENTED,
            Self::Failure(status) => *status,
            Self::Config(_) => Status::FAIL,
        }
    }

    /// Rebuild an error from a failure status received from the peer.
    ///
    /// `required` is only consulted for [`Status::MORE_DATA`].
    pub fn from_status(status: Status, required: u32) -> Self {
        match status {
            Status::MORE_DATA => Self::MoreData { required },
            Status::NOT_FOUND => Self::NotFound,
            Status::INVALID_ARGUMENT => {
                Self::InvalidArgument("rejected by peer".to_string())
            }
            Status::INVALID_DATA => Self::Protocol("peer rejected message data".to_string()),
            other => Self::Failure(other),
        }
    }

    /// Check if this is the internal fall-through sentinel.
    #[inline]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }
}

/// Result type alias using BawireError.
pub type Result<T> = std::result::Result<T, BawireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_round_trip() {
        let err = BawireError::from_status(Status::MORE_DATA, 4);
        assert!(matches!(err, BawireError::MoreData { required: 4 }));
        assert_eq!(err.status(), Status::MORE_DATA);

        let err = BawireError::from_status(Status::NOT_FOUND, 0);
        assert!(matches!(err, BawireError::NotFound));
    }

    #[test]
    fn test_unknown_status_becomes_failure() {
        let status = Status(0x8007_0643);
        let err = BawireError::from_status(status, 0);
        assert!(matches!(err, BawireError::Failure(s) if s == status));
        assert_eq!(err.status(), status);
    }

    #[test]
    fn test_codec_errors_report_invalid_data() {
        let underrun = BawireError::BufferUnderrun {
            needed: 4,
            available: 1,
        };
        assert_eq!(underrun.status(), Status::INVALID_DATA);
        assert_eq!(
            BawireError::Protocol("bad".into()).status(),
            Status::INVALID_DATA
        );
    }

    #[test]
    fn test_error_display() {
        let err = BawireError::MoreData { required: 12 };
        assert!(err.to_string().contains("12 characters required"));
    }
}
