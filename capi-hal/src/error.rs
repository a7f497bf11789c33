//! Common error types for capi-hal.
//!
//! The dispatch layer surfaces exactly one kind of its own,
//! [`Error::InvalidArgument`], for a missing handle, table, or operation slot.
//! Every other variant is produced by backends (or by board bring-up) and
//! travels through the dispatch layer untouched.

use thiserror::Error;

/// Negative errno values used by [`Error::code`].
pub mod errno {
    pub const EIO: i32 = 5;
    pub const EAGAIN: i32 = 11;
    pub const EBUSY: i32 = 16;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
    pub const ERANGE: i32 = 34;
    pub const ETIMEDOUT: i32 = 110;
}

/// Main error type for capi-hal operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Null handle, null capability table, or unsupported operation slot
    #[error("invalid argument")]
    InvalidArgument,

    /// Resource is busy
    #[error("device busy")]
    Busy,

    /// Device is in the wrong state for the request (not started, not configured)
    #[error("not ready: {0}")]
    NotReady(String),

    /// Backend gave up waiting on the peripheral
    #[error("timed out")]
    Timeout,

    /// No backend or device matches the request
    #[error("no such device: {0}")]
    NoDevice(String),

    /// Identifier or value outside what the backend supports
    #[error("{what} out of range: {value} (max {max})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        max: i64,
    },

    /// Raw backend status code, passed through verbatim
    #[error("backend error {0}")]
    Backend(i32),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Board description parse errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// C-style status code for this error.
    ///
    /// [`Error::Backend`] carries the backend's own code and is returned
    /// verbatim; every other variant maps to a negative errno.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidArgument => -errno::EINVAL,
            Error::Busy => -errno::EBUSY,
            Error::NotReady(_) => -errno::EAGAIN,
            Error::Timeout => -errno::ETIMEDOUT,
            Error::NoDevice(_) => -errno::ENODEV,
            Error::OutOfRange { .. } => -errno::ERANGE,
            Error::Backend(code) => *code,
            Error::Config(_) | Error::Json(_) => -errno::EINVAL,
            Error::Io(e) => -e.raw_os_error().unwrap_or(errno::EIO).abs(),
        }
    }

    /// True for the single error kind raised by the dispatch guards.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument)
    }
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Collapse a unit result into the `0` / negative errno convention.
pub fn status(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Error::InvalidArgument, -22; "invalid argument")]
    #[test_case(Error::Busy, -16; "busy")]
    #[test_case(Error::NotReady("stopped".into()), -11; "not ready")]
    #[test_case(Error::Timeout, -110; "timeout")]
    #[test_case(Error::NoDevice("x".into()), -19; "no device")]
    #[test_case(Error::Backend(-5), -5; "negative backend code")]
    #[test_case(Error::Backend(-1000), -1000; "vendor backend code")]
    fn test_error_codes(err: Error, expected: i32) {
        assert_eq!(err.code(), expected);
    }

    #[test]
    fn test_status() {
        assert_eq!(status(Ok(())), 0);
        assert_eq!(status(Err(Error::InvalidArgument)), -errno::EINVAL);
        assert_ne!(
            status(Err(Error::NotReady("stopped".into()))),
            status(Err(Error::InvalidArgument))
        );
    }
}
