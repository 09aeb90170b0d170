//! Read-only drive decorator.
//!
//! This module provides a drive implementation that wraps another one and
//! prevents mutating operations from executing, while indicating success on
//! return. Used for dry runs.

use async_trait::async_trait;

use crate::backend::{ItemStream, Recursion};
use crate::error::Result;
use crate::item::ItemMeta;
use crate::models::{FolderHandle, Page, PageToken};
use crate::{Drive, DriveHandle};

/// Prefix of the identifiers handed out for folders that were never created.
pub const DRY_RUN_ID_PREFIX: &str = "dry-run:";

/// Read-only drive.
///
/// Wraps another drive and silently drops folder creation and relocation,
/// logging an [`info event`](tracing::Event) for each. Folder creation returns
/// a synthetic handle (identifier prefixed with [`DRY_RUN_ID_PREFIX`]) so that
/// callers can keep resolving paths below it.
#[derive(Clone)]
pub struct ReadOnlyDrive {
    inner: DriveHandle,
}
impl ReadOnlyDrive {
    pub fn new(inner: DriveHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Drive for ReadOnlyDrive {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn root(&self) -> Result<FolderHandle> {
        self.inner.root().await
    }

    async fn list_page(&self, folder: &FolderHandle, token: Option<PageToken>) -> Result<Page> {
        // Synthetic folders have no children on the inner drive.
        if folder.id.starts_with(DRY_RUN_ID_PREFIX) {
            return Ok(Page { items: Vec::new(), next: None });
        }
        self.inner.list_page(folder, token).await
    }

    fn list_children<'a>(&'a self, folder: &'a FolderHandle) -> ItemStream<'a> {
        if folder.id.starts_with(DRY_RUN_ID_PREFIX) {
            return Box::pin(futures::stream::empty());
        }
        self.inner.list_children(folder)
    }

    async fn list_folders(&self, folder: &FolderHandle, recursion: Recursion) -> Result<Vec<FolderHandle>> {
        if folder.id.starts_with(DRY_RUN_ID_PREFIX) {
            return Ok(Vec::new());
        }
        self.inner.list_folders(folder, recursion).await
    }

    async fn create_folder(&self, name: &str, parent: &FolderHandle) -> Result<FolderHandle> {
        let handle = FolderHandle::child_of(format!("{DRY_RUN_ID_PREFIX}{}/{name}", parent.full_path()), name, parent);
        tracing::info!(path = %handle.full_path(), "Skipping folder creation during read-only mode");
        Ok(handle)
    }

    async fn relocate(&self, item: &ItemMeta, destination: &FolderHandle) -> Result<()> {
        tracing::info!(path = %item.full_path(), destination = %destination.full_path(), "Skipping relocation during read-only mode");
        Ok(())
    }
}
