//! Path-to-folder resolution.
//!
//! A [`FolderIndex`] answers "which folder lives at this full path?" for
//! everything at or below one root, creating missing folders on demand. The
//! first lookup lists the root's whole folder subtree in a single
//! [`list_folders`](Drive::list_folders) call; after that the index is kept
//! up to date locally and never re-reads the drive.

pub mod error;

use self::error::{ErrorKind, Result};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use exn::ResultExt;
use rollsort_drive::{DriveHandle, FolderHandle, Recursion, SEPARATOR, segments_below, validate_path};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Full path to folder map for one subtree of a drive.
///
/// Lookups take `&mut self`: the index is owned by a single coordinating task,
/// so two resolutions of the same missing path can never race each other into
/// a duplicate folder.
pub struct FolderIndex {
    drive: DriveHandle,
    root: FolderHandle,
    root_path: String,
    folders: Option<HashMap<String, FolderHandle>>,
}

impl FolderIndex {
    pub fn new(drive: DriveHandle, root: FolderHandle) -> Self {
        let root_path = root.full_path();
        Self {
            drive,
            root,
            root_path,
            folders: None,
        }
    }

    pub fn root(&self) -> &FolderHandle {
        &self.root
    }

    /// Number of indexed folders, including the root. Zero until the first
    /// lookup.
    pub fn len(&self) -> usize {
        self.folders.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the folder at `path` without creating anything.
    pub async fn get(&mut self, path: &str) -> Result<Option<FolderHandle>> {
        let (path, _) = self.check(path)?;
        self.bootstrap().await?;
        Ok(self.folders.as_ref().and_then(|folders| folders.get(&path)).cloned())
    }

    /// Direct child folders of the folder at `path`, ordered by name.
    pub async fn children(&mut self, path: &str) -> Result<Vec<FolderHandle>> {
        let (path, _) = self.check(path)?;
        self.bootstrap().await?;
        let mut children: Vec<FolderHandle> = self
            .folders
            .iter()
            .flat_map(HashMap::values)
            .filter(|folder| folder.parent_path == path)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    /// Return the folder at `path`, creating it and any missing ancestors
    /// (outermost first) if needed.
    ///
    /// Creation collisions are not merged: if the drive reports that a name is
    /// already taken (for example by a file), this fails with
    /// [`ErrorKind::Create`].
    #[instrument(skip(self), fields(root = %self.root_path))]
    pub async fn resolve_or_create(&mut self, path: &str) -> Result<FolderHandle> {
        let (path, segments) = self.check(path)?;
        self.bootstrap().await?;
        let folders = self.folders.get_or_insert_with(HashMap::new);
        if let Some(existing) = folders.get(&path) {
            return Ok(existing.clone());
        }

        let mut current = self.root.clone();
        let mut current_path = self.root_path.clone();
        for segment in segments {
            current_path = format!("{current_path}{SEPARATOR}{segment}");
            current = match folders.get(&current_path) {
                Some(existing) => existing.clone(),
                None => {
                    info!(path = %current_path, "Creating folder");
                    let created = self
                        .drive
                        .create_folder(&segment, &current)
                        .await
                        .or_raise(|| ErrorKind::Create(current_path.clone()))?;
                    folders.insert(current_path.clone(), created.clone());
                    created
                },
            };
        }
        Ok(current)
    }

    /// Validate `path` and split off the segments below the root. Never
    /// touches the drive.
    fn check(&self, path: &str) -> Result<(String, Vec<String>)> {
        let normalized = validate_path(path).or_raise(|| ErrorKind::InvalidPath(path.to_string()))?;
        let Some(segments) = segments_below(&self.root_path, &normalized) else {
            exn::bail!(ErrorKind::InvalidPath(path.to_string()));
        };
        let segments = segments.into_iter().map(str::to_string).collect();
        Ok((normalized, segments))
    }

    async fn bootstrap(&mut self) -> Result<()> {
        if self.folders.is_some() {
            return Ok(());
        }
        let found = self
            .drive
            .list_folders(&self.root, Recursion::Recursive)
            .await
            .or_raise(|| ErrorKind::Bootstrap)?;
        let mut folders = HashMap::with_capacity(found.len() + 1);
        folders.insert(self.root_path.clone(), self.root.clone());
        for folder in found {
            folders.insert(folder.full_path(), folder);
        }
        debug!(root = %self.root_path, folders = folders.len(), "Indexed existing folders");
        self.folders = Some(folders);
        Ok(())
    }
}

/// Find the folder at a full `path`, searching from the drive's root.
pub async fn locate(drive: &DriveHandle, path: &str) -> LibraryResult<Option<FolderHandle>> {
    let root = drive.root().await.or_raise(|| LibraryErrorKind::Index)?;
    FolderIndex::new(drive.clone(), root).get(path).await.or_raise(|| LibraryErrorKind::Index)
}
