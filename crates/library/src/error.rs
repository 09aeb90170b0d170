//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Module-level errors (e.g.
//! [`index::error`](crate::index::error)) are raised into these kinds at the
//! public entry points.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a library failure.
///
/// ### Fatal
/// - [`ErrorKind::Walk`]
/// - [`ErrorKind::Index`]
/// - [`ErrorKind::Periods`]
/// - [`ErrorKind::Dated`]
///
/// ### Isolated
/// - [`ErrorKind::Relocate`] - a single item could not be moved; sibling
///   relocations carry on.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Listing a folder failed during traversal.
    #[display("tree traversal failed")]
    Walk,
    /// Resolving or creating a destination folder failed.
    #[display("folder index failed")]
    Index,
    /// The drive refused to relocate this item (full path).
    #[display("relocation failed: {_0}")]
    Relocate(#[error(not(source))] String),
    /// Filling in period folders failed.
    #[display("period folder creation failed")]
    Periods,
    /// Sorting by filename date failed before any relocation started.
    #[display("filename date sorting failed")]
    Dated,
}

impl ErrorKind {
    /// Returns `true` if only a single item was affected.
    pub fn is_isolated(&self) -> bool {
        matches!(self, Self::Relocate(_))
    }
}
