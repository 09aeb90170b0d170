//! Drive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Gateways own retry policy; the
//! [`is_retryable`](ErrorKind::is_retryable) hint is there for them.

use derive_more::{Display, Error};

/// A drive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for drive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Item or folder does not exist (by identifier or full path)
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// A sibling with the same name already exists under the parent folder
    #[display("already exists: {_0}")]
    AlreadyExists(#[error(not(source))] String),
    /// Logical path is empty, malformed or escapes its root
    #[display("invalid path: {_0}")]
    InvalidPath(#[error(not(source))] String),
    /// Access denied (permissions or credentials)
    #[display("permission denied: {_0}")]
    PermissionDenied(#[error(not(source))] String),
    /// Network-related error (timeouts, throttling, dropped connections)
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// Gateway-specific error
    #[display("backend error: {_0}")]
    Backend(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Network("timeout".into()), true)]
    #[case(ErrorKind::Backend("503".into()), true)]
    #[case(ErrorKind::AlreadyExists("/root/a".into()), false)]
    #[case(ErrorKind::NotFound("abc".into()), false)]
    #[case(ErrorKind::InvalidPath("".into()), false)]
    fn test_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }

    #[test]
    fn test_display() {
        let kind = ErrorKind::AlreadyExists("/root/Pictures/2014".into());
        assert_eq!(kind.to_string(), "already exists: /root/Pictures/2014");
    }
}
