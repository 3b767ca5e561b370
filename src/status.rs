//! Numeric status codes carried in reply frames.
//!
//! Statuses are HRESULT-shaped: bit 31 set means failure. Win32 error codes
//! are folded in with [`Status::from_win32`], which is how the retry tables
//! compare installer results.

use std::fmt;

/// A 32-bit status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Status(pub u32);

impl Status {
    /// Success.
    pub const OK: Status = Status(0);
    /// Unspecified failure.
    pub const FAIL: Status = Status(0x8000_4005);
    /// Not implemented. Internal only, never sent as a reply status.
    pub const NOT_IMPLEMENTED: Status = Status(0x8000_4001);
    /// Invalid argument.
    pub const INVALID_ARGUMENT: Status = Status(0x8007_0057);
    /// Invalid data (malformed message, buffer underrun).
    pub const INVALID_DATA: Status = Status(0x8007_000D);
    /// The pipe was closed.
    pub const BROKEN_PIPE: Status = Status(0x8007_006D);
    /// More data is available than the caller's buffer can hold.
    pub const MORE_DATA: Status = Status(0x8007_00EA);
    /// Element not found.
    pub const NOT_FOUND: Status = Status(0x8007_0490);

    /// Fold a Win32 error code into a status (`HRESULT_FROM_WIN32`).
    #[inline]
    pub const fn from_win32(code: u32) -> Status {
        if code as i32 <= 0 {
            Status(code)
        } else {
            Status((code & 0x0000_FFFF) | 0x8007_0000)
        }
    }

    /// Check if this status is a success code.
    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 & 0x8000_0000 == 0
    }

    /// Check if this status is a failure code.
    #[inline]
    pub const fn is_failure(self) -> bool {
        !self.is_success()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

impl From<u32> for Status {
    fn from(value: u32) -> Self {
        Status(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_win32() {
        assert_eq!(Status::from_win32(0), Status::OK);
        assert_eq!(Status::from_win32(2), Status(0x8007_0002));
        assert_eq!(Status::from_win32(1603), Status(0x8007_0643));
        assert_eq!(Status::from_win32(234), Status::MORE_DATA);
    }

    #[test]
    fn test_success_and_failure() {
        assert!(Status::OK.is_success());
        assert!(Status(1).is_success());
        assert!(Status::FAIL.is_failure());
        assert!(Status::MORE_DATA.is_failure());
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::NOT_FOUND.to_string(), "0x80070490");
    }
}
