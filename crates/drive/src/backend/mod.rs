//! Drive trait and implementations.
//!
//! This module defines the [`Drive`] trait: the narrow gateway the sorting
//! engine uses to talk to a remote hierarchical store (listing, folder
//! creation, relocation). Authentication, wire protocol and retry policy all
//! live behind it.

#[cfg(feature = "mock")]
mod mock;
mod ro;

#[cfg(feature = "mock")]
pub use self::mock::MockDrive;
pub use self::ro::ReadOnlyDrive;
use crate::error::Result;
use crate::item::{Item, ItemMeta};
use crate::models::{FolderHandle, Page, PageToken};
use async_stream::stream;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

pub type ItemStream<'a> = Pin<Box<dyn Stream<Item = Result<Item>> + Send + 'a>>;

/// How far [`Drive::list_folders`] descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recursion {
    /// Immediate child folders only.
    Shallow,
    /// The whole subtree below the folder.
    Recursive,
}

/// Unified interface for remote drives.
///
/// All operations are asynchronous; every call is a network round-trip for a
/// real gateway and the only place the engine suspends.
///
/// # Examples
///
/// ```
/// use futures::TryStreamExt;
/// use rollsort_drive::{Drive, error::Result};
///
/// async fn count_children(drive: &dyn Drive) -> Result<usize> {
///     let root = drive.root().await?;
///     let mut count = 0;
///     let mut children = drive.list_children(&root);
///     while let Some(_item) = children.try_next().await? {
///         count += 1;
///     }
///     Ok(count)
/// }
/// ```
#[async_trait]
pub trait Drive: Send + Sync {
    /// Name of the configured drive, used for logging only.
    fn name(&self) -> &str;

    /// The drive's root folder.
    async fn root(&self) -> Result<FolderHandle>;

    /// Fetch one page of `folder`'s immediate children.
    ///
    /// Pass `None` for the first page, then each returned
    /// [`next`](Page::next) token until it is `None`.
    async fn list_page(&self, folder: &FolderHandle, token: Option<PageToken>) -> Result<Page>;

    /// Stream all of `folder`'s immediate children, following page tokens.
    ///
    /// Each page fetch is one suspension point. The stream ends after the
    /// last page, or after yielding the first error.
    fn list_children<'a>(&'a self, folder: &'a FolderHandle) -> ItemStream<'a> {
        Box::pin(stream! {
            let mut token = None;
            loop {
                let page = match self.list_page(folder, token).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                };
                tracing::debug!(drive = self.name(), folder = %folder.full_path(), items = page.items.len(), more = page.next.is_some(), "Fetched page");
                for item in page.items {
                    yield Ok(item);
                }
                match page.next {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }
        })
    }

    /// List child folders of `folder`, optionally the whole subtree.
    ///
    /// The default implementation descends breadth-first over
    /// [`list_children()`](Self::list_children), so it costs one listing per
    /// folder. Gateways with a bulk endpoint should override it.
    async fn list_folders(&self, folder: &FolderHandle, recursion: Recursion) -> Result<Vec<FolderHandle>> {
        let mut found = Vec::new();
        let mut queue = VecDeque::from([folder.clone()]);
        while let Some(current) = queue.pop_front() {
            let children: Vec<Item> = self.list_children(&current).try_collect().await?;
            for child in children.iter().filter_map(|item| item.as_folder()) {
                if recursion == Recursion::Recursive {
                    queue.push_back(child.clone());
                }
                found.push(child);
            }
        }
        Ok(found)
    }

    /// Create a folder named `name` under `parent`.
    ///
    /// Fails with [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if
    /// `parent` already has a child of that name; never merges or renames.
    async fn create_folder(&self, name: &str, parent: &FolderHandle) -> Result<FolderHandle>;

    /// Move `item` into `destination`, keeping its name.
    async fn relocate(&self, item: &ItemMeta, destination: &FolderHandle) -> Result<()>;
}
