//! Move matching items from one folder tree into another.
//!
//! [`relocate_stream`] walks a source root, keeps the items a predicate
//! accepts, works out each one's destination (the same relative folder under
//! the destination root, created if missing) and then moves them with bounded
//! concurrency. [`relocate`] drives the same stream to completion and
//! returns a [`Summary`].
//!
//! Folder resolution happens on the coordinating task, one item at a time, and
//! finishes before the first move starts. Only the moves themselves run
//! concurrently.

mod dispatch;
mod stream;

pub(crate) use self::dispatch::dispatch;
pub use self::stream::{RelocateEvent, relocate, relocate_stream};
use crate::error::Result;
use rollsort_drive::{Classified, FolderHandle, Item};

/// One planned (or completed) move.
#[derive(Debug, Clone, PartialEq)]
pub struct Relocation {
    pub item: Item<Classified>,
    pub destination: FolderHandle,
}

/// Outcome counts for a batch of relocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Moves handed to the drive.
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Items matched but deliberately left where they are.
    pub skipped: u64,
}
impl Summary {
    pub(crate) fn record(&mut self, outcome: &Result<Relocation>) {
        self.attempted += 1;
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }
}
