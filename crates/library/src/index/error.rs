//! Error types for the [`index`](super) module.

use derive_more::{Display, Error};

/// A folder index error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for folder index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// ### Usage Errors
/// - [`ErrorKind::InvalidPath`] - raised before any drive call is made.
///
/// ### Dependency Errors
/// - [`ErrorKind::Bootstrap`]
/// - [`ErrorKind::Create`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The path is malformed, or does not lie at or below the index root.
    #[display("invalid folder path: {_0}")]
    InvalidPath(#[error(not(source))] String),
    /// The one-off recursive folder listing failed.
    #[display("could not list existing folders")]
    Bootstrap,
    /// The drive refused to create the folder at this full path. Includes
    /// the case where a non-folder item already holds the name.
    #[display("could not create folder: {_0}")]
    Create(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if the caller passed a bad path, rather than the drive
    /// failing.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidPath(_))
    }
}
