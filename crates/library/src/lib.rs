//! Classification-and-relocation engine.
//!
//! - [`walk()`] streams every item below a folder, breadth first, classified by
//!   the [`Context`]'s rule [`Chain`].
//! - [`FolderIndex`] maps full paths to folders, creating missing ones.
//! - [`relocate()`] moves matching items from one root to the same relative
//!   location under another, with bounded concurrency.
//! - [`fill_periods`] and [`sort_by_filename_date`] build on the same pieces.

pub mod dated;
pub mod error;
pub mod index;
pub mod periods;
pub mod relocate;
pub mod walk;

pub use crate::dated::sort_by_filename_date;
pub use crate::index::{FolderIndex, locate};
pub use crate::periods::fill_periods;
pub use crate::relocate::{RelocateEvent, Relocation, Summary, relocate, relocate_stream};
pub use crate::walk::{children, unclassified, walk};
pub use rollsort_classify::Chain;
use rollsort_config::Config;
use rollsort_drive::DriveHandle;
use rollsort_drive::backend::ReadOnlyDrive;
use std::sync::Arc;

/// Default maximum number of relocations in flight at once.
pub const MAX_RELOCATE_CONCURRENCY: usize = 16;

/// Settings shared by every operation in this crate.
#[derive(Debug, Clone)]
pub struct Context {
    /// Rule chain used to classify every listed item.
    pub chain: Chain,
    /// Maximum number of relocations in flight at once (at least 1).
    pub concurrency: usize,
    /// Period folder names expected under each year folder.
    pub periods: Vec<String>,
    /// Wrap drives passed through [`Context::drive`] in a [`ReadOnlyDrive`].
    pub dry_run: bool,
}
impl Default for Context {
    fn default() -> Self {
        Self {
            chain: Chain::default(),
            concurrency: MAX_RELOCATE_CONCURRENCY,
            periods: (1..=12).map(|month| format!("{month:02}")).collect(),
            dry_run: false,
        }
    }
}
impl Context {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chain: Chain::default(),
            concurrency: config.concurrency.max(1),
            periods: config.periods.iter().map(|p| p.trim().to_string()).collect(),
            dry_run: config.dry_run,
        }
    }

    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The drive to run operations against: `drive` itself, or a read-only
    /// view of it when [`dry_run`](Self::dry_run) is set.
    pub fn drive(&self, drive: DriveHandle) -> DriveHandle {
        match self.dry_run {
            true => Arc::new(ReadOnlyDrive::new(drive)),
            false => drive,
        }
    }
}
