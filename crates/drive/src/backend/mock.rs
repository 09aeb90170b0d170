//! In-memory drive for testing.

use crate::Drive;
use crate::backend::Recursion;
use crate::error::{ErrorKind, Result};
use crate::item::{Item, ItemMeta};
use crate::models::{Attributes, FolderHandle, Page, PageToken};
use crate::path::{SEPARATOR, validate as validate_path};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

const ROOT_ID: &str = "root";
const DEFAULT_PAGE_SIZE: usize = 200;

struct Node {
    name: String,
    parent: Option<String>,
    attributes: Attributes,
}

#[derive(Default)]
struct State {
    nodes: HashMap<String, Node>,
    next_id: usize,
    created: Vec<String>,
    relocations: Vec<(String, String)>,
}
impl State {
    fn full_path(&self, id: &str) -> Option<String> {
        let node = self.nodes.get(id)?;
        match &node.parent {
            None => Some(format!("{SEPARATOR}{}", node.name)),
            Some(parent) => Some(format!("{}{SEPARATOR}{}", self.full_path(parent)?, node.name)),
        }
    }

    fn children_of(&self, id: &str) -> Vec<(&String, &Node)> {
        let mut children: Vec<_> = self.nodes.iter().filter(|(_, n)| n.parent.as_deref() == Some(id)).collect();
        children.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        children
    }

    fn child_named(&self, id: &str, name: &str) -> Option<String> {
        self.children_of(id).into_iter().find(|(_, n)| n.name == name).map(|(id, _)| id.clone())
    }

    fn handle(&self, id: &str) -> Option<FolderHandle> {
        let node = self.nodes.get(id)?;
        let parent_path = match &node.parent {
            None => String::new(),
            Some(parent) => self.full_path(parent)?,
        };
        Some(FolderHandle::new(id, node.name.clone(), parent_path))
    }

    fn insert(&mut self, name: &str, parent: &str, attributes: Attributes) -> String {
        self.next_id += 1;
        let id = format!("item-{}", self.next_id);
        self.nodes.insert(
            id.clone(),
            Node {
                name: name.to_string(),
                parent: Some(parent.to_string()),
                attributes,
            },
        );
        id
    }

    /// Walk (and create) the folders named by `segments`, returning the id of
    /// the last one.
    fn ensure_folders(&mut self, segments: &[&str]) -> String {
        let mut current = ROOT_ID.to_string();
        for segment in segments {
            current = match self.child_named(&current, segment) {
                Some(id) => id,
                None => self.insert(segment, &current, Attributes::folder()),
            };
        }
        current
    }
}

/// In-memory drive for testing.
///
/// Holds a tree of folders and items behind a [`Mutex`] (never held across an
/// `.await`), pages listings with a configurable page size, and records every
/// mutation so tests can assert on call counts and ordering:
///
/// - [`created()`](Self::created): full paths passed through
///   [`create_folder`](Drive::create_folder), in call order.
/// - [`relocations()`](Self::relocations): `(from, to)` pairs, in completion order.
/// - [`max_in_flight()`](Self::max_in_flight): the peak number of
///   [`relocate`](Drive::relocate) calls outstanding at once.
///
/// # Examples
///
/// ```
/// use rollsort_drive::{Drive, backend::MockDrive};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let drive = MockDrive::new()
///     .with_page_size(2)
///     .with_file("/root/Pictures/Camera Roll/2014/02/a.jpg");
/// let roll = drive.folder("/root/Pictures/Camera Roll").unwrap();
/// let created = drive.create_folder("2015", &roll).await?;
/// assert_eq!(created.full_path(), "/root/Pictures/Camera Roll/2015");
/// assert_eq!(drive.created(), vec!["/root/Pictures/Camera Roll/2015"]);
/// # Ok(())
/// # }
/// ```
pub struct MockDrive {
    name: String,
    page_size: usize,
    state: Mutex<State>,
    failing_relocations: HashSet<String>,
    failing_listings: HashSet<String>,
    page_fetches: AtomicUsize,
    folder_listings: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockDrive {
    /// Create an empty drive containing only the root folder (`/root`).
    pub fn new() -> Self {
        let mut state = State::default();
        state.nodes.insert(
            ROOT_ID.to_string(),
            Node {
                name: ROOT_ID.to_string(),
                parent: None,
                attributes: Attributes::folder(),
            },
        );
        Self {
            name: "mock".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            state: Mutex::new(state),
            failing_relocations: HashSet::new(),
            failing_listings: HashSet::new(),
            page_fetches: AtomicUsize::new(0),
            folder_listings: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Change the name of the mock drive.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Change how many children are returned per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add a folder (and any missing ancestors).
    ///
    /// Panics if the path is invalid or not below `/root`. If test setup is
    /// wrong, then the test should not pass.
    pub fn with_folder(self, path: &str) -> Self {
        let segments = Self::setup_segments(path);
        self.lock().ensure_folders(&segments);
        self
    }

    /// Add an item with the given attributes (and any missing ancestor folders).
    pub fn with_item(self, path: &str, attributes: Attributes) -> Self {
        let segments = Self::setup_segments(path);
        let Some((name, parents)) = segments.split_last() else {
            panic!("MockDrive::with_item: cannot replace the root folder");
        };
        let mut state = self.lock();
        let parent = state.ensure_folders(parents);
        state.insert(name, &parent, attributes);
        drop(state);
        self
    }

    /// Add an item with no readable metadata.
    pub fn with_file(self, path: &str) -> Self {
        self.with_item(path, Attributes::unreadable())
    }

    /// Make every relocation of an item with this name fail.
    pub fn with_failing_relocation(mut self, name: impl Into<String>) -> Self {
        self.failing_relocations.insert(name.into());
        self
    }

    /// Make every listing of the folder at this full path fail.
    pub fn with_failing_listing(mut self, path: impl Into<String>) -> Self {
        self.failing_listings.insert(path.into());
        self
    }

    /// Look up a folder by full path.
    pub fn folder(&self, path: &str) -> Option<FolderHandle> {
        let state = self.lock();
        let segments = crate::path::segments_below(&format!("{SEPARATOR}{ROOT_ID}"), path)?;
        let mut current = ROOT_ID.to_string();
        for segment in segments {
            current = state.child_named(&current, segment)?;
        }
        state.nodes.get(&current).filter(|n| n.attributes.is_folder())?;
        state.handle(&current)
    }

    /// Current full path of the item with this identifier.
    pub fn item_path(&self, id: &str) -> Option<String> {
        self.lock().full_path(id)
    }

    pub fn created(&self) -> Vec<String> {
        self.lock().created.clone()
    }

    pub fn relocations(&self) -> Vec<(String, String)> {
        self.lock().relocations.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of [`list_page`](Drive::list_page) calls served.
    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    /// Number of (bulk) [`list_folders`](Drive::list_folders) calls served.
    pub fn folder_listings(&self) -> usize {
        self.folder_listings.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock means a test already panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn setup_segments(path: &str) -> Vec<&str> {
        let Ok(validated) = validate_path(path) else {
            // The panic here is DELIBERATE. MockDrive is intended to be
            // used in tests; panics are expected. There is no error result.
            panic!("MockDrive: invalid path {path}");
        };
        let root = format!("{SEPARATOR}{ROOT_ID}");
        if crate::path::segments_below(&root, &validated).is_none() {
            panic!("MockDrive: path {path} is not below {root}");
        }
        // Re-borrow from the input so the segments outlive the validated copy.
        path.trim_end_matches(SEPARATOR).split(SEPARATOR).skip(2).collect()
    }
}
impl Default for MockDrive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Drive for MockDrive {
    fn name(&self) -> &str {
        &self.name
    }

    async fn root(&self) -> Result<FolderHandle> {
        self.lock().handle(ROOT_ID).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(ROOT_ID.to_string())))
    }

    async fn list_page(&self, folder: &FolderHandle, token: Option<PageToken>) -> Result<Page> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        let path = folder.full_path();
        if self.failing_listings.contains(&path) {
            exn::bail!(ErrorKind::Network(format!("listing {path} timed out")));
        }
        let offset = match token {
            None => 0,
            Some(PageToken(token)) => match token.parse::<usize>() {
                Ok(offset) => offset,
                Err(_) => exn::bail!(ErrorKind::Backend(format!("bad page token {token}"))),
            },
        };
        let state = self.lock();
        if !state.nodes.contains_key(&folder.id) {
            exn::bail!(ErrorKind::NotFound(folder.id.clone()));
        }
        let children = state.children_of(&folder.id);
        let items = children
            .iter()
            .skip(offset)
            .take(self.page_size)
            .map(|(id, node)| Item::new(id.as_str(), node.name.clone(), folder.clone(), node.attributes.clone()))
            .collect();
        let end = offset + self.page_size;
        let next = (end < children.len()).then(|| PageToken(end.to_string()));
        Ok(Page { items, next })
    }

    async fn list_folders(&self, folder: &FolderHandle, recursion: Recursion) -> Result<Vec<FolderHandle>> {
        self.folder_listings.fetch_add(1, Ordering::SeqCst);
        let path = folder.full_path();
        if self.failing_listings.contains(&path) {
            exn::bail!(ErrorKind::Network(format!("listing {path} timed out")));
        }
        let state = self.lock();
        if !state.nodes.contains_key(&folder.id) {
            exn::bail!(ErrorKind::NotFound(folder.id.clone()));
        }
        let mut found = Vec::new();
        let mut queue = VecDeque::from([folder.id.clone()]);
        while let Some(current) = queue.pop_front() {
            for (id, node) in state.children_of(&current) {
                if !node.attributes.is_folder() {
                    continue;
                }
                if let Some(handle) = state.handle(id) {
                    found.push(handle);
                }
                if recursion == Recursion::Recursive {
                    queue.push_back(id.clone());
                }
            }
        }
        Ok(found)
    }

    async fn create_folder(&self, name: &str, parent: &FolderHandle) -> Result<FolderHandle> {
        let mut state = self.lock();
        if !state.nodes.contains_key(&parent.id) {
            exn::bail!(ErrorKind::NotFound(parent.id.clone()));
        }
        let path = format!("{}{SEPARATOR}{name}", parent.full_path());
        if state.child_named(&parent.id, name).is_some() {
            exn::bail!(ErrorKind::AlreadyExists(path));
        }
        let id = state.insert(name, &parent.id, Attributes::folder());
        state.created.push(path);
        Ok(FolderHandle::child_of(id, name, parent))
    }

    async fn relocate(&self, item: &ItemMeta, destination: &FolderHandle) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Give sibling relocations a chance to start before this one finishes.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        let result = self.relocate_now(item, destination);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl MockDrive {
    fn relocate_now(&self, item: &ItemMeta, destination: &FolderHandle) -> Result<()> {
        if self.failing_relocations.contains(&item.name) {
            exn::bail!(ErrorKind::Network(format!("relocating {} was throttled", item.full_path())));
        }
        let mut state = self.lock();
        if !state.nodes.get(&destination.id).is_some_and(|n| n.attributes.is_folder()) {
            exn::bail!(ErrorKind::NotFound(destination.id.clone()));
        }
        let Some(from) = state.full_path(&item.id) else {
            exn::bail!(ErrorKind::NotFound(item.id.clone()));
        };
        if state.child_named(&destination.id, &item.name).is_some() {
            exn::bail!(ErrorKind::AlreadyExists(format!("{}{SEPARATOR}{}", destination.full_path(), item.name)));
        }
        if let Some(node) = state.nodes.get_mut(&item.id) {
            node.parent = Some(destination.id.clone());
        }
        state.relocations.push((from, destination.full_path()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_with_item_creates_ancestors() {
        let drive = MockDrive::new().with_file("/root/Pictures/Camera Roll/2014/02/a.jpg");
        assert!(drive.folder("/root/Pictures").is_some());
        assert!(drive.folder("/root/Pictures/Camera Roll/2014/02").is_some());
        // Files are not folders.
        assert!(drive.folder("/root/Pictures/Camera Roll/2014/02/a.jpg").is_none());
        let root = drive.root().await.unwrap();
        assert_eq!(root.full_path(), "/root");
    }

    #[tokio::test]
    async fn test_pagination() {
        let drive = MockDrive::new()
            .with_page_size(2)
            .with_file("/root/a.jpg")
            .with_file("/root/b.jpg")
            .with_file("/root/c.jpg");
        let root = drive.root().await.unwrap();
        let first = drive.list_page(&root, None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let second = drive.list_page(&root, first.next).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.next.is_none());

        let all: Vec<_> = drive.list_children(&root).try_collect().await.unwrap();
        let names: Vec<_> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn test_list_folders() {
        let drive = MockDrive::new()
            .with_folder("/root/Pictures/iPhone/2014/02")
            .with_file("/root/Pictures/iPhone/2014/a.jpg");
        let root = drive.root().await.unwrap();
        let shallow = drive.list_folders(&root, Recursion::Shallow).await.unwrap();
        assert_eq!(shallow.iter().map(|f| f.full_path()).collect::<Vec<_>>(), ["/root/Pictures"]);
        let deep = drive.list_folders(&root, Recursion::Recursive).await.unwrap();
        assert_eq!(
            deep.iter().map(|f| f.full_path()).collect::<Vec<_>>(),
            ["/root/Pictures", "/root/Pictures/iPhone", "/root/Pictures/iPhone/2014", "/root/Pictures/iPhone/2014/02"]
        );
        assert_eq!(drive.folder_listings(), 2);
    }

    #[tokio::test]
    async fn test_create_folder_conflict() {
        let drive = MockDrive::new().with_folder("/root/Pictures");
        let root = drive.root().await.unwrap();
        let err = drive.create_folder("Pictures", &root).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(p) if p == "/root/Pictures"));
        assert!(drive.created().is_empty());
    }

    #[tokio::test]
    async fn test_relocate() {
        let drive = MockDrive::new().with_file("/root/Camera Roll/a.jpg").with_folder("/root/iPhone");
        let roll = drive.folder("/root/Camera Roll").unwrap();
        let iphone = drive.folder("/root/iPhone").unwrap();
        let items: Vec<_> = drive.list_children(&roll).try_collect().await.unwrap();
        drive.relocate(&items[0], &iphone).await.unwrap();
        assert_eq!(drive.item_path(&items[0].id).as_deref(), Some("/root/iPhone/a.jpg"));
        assert_eq!(drive.relocations(), vec![("/root/Camera Roll/a.jpg".to_string(), "/root/iPhone".to_string())]);
        assert_eq!(drive.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_failures() {
        let drive = MockDrive::new()
            .with_file("/root/Camera Roll/a.jpg")
            .with_failing_relocation("a.jpg")
            .with_failing_listing("/root/Camera Roll");
        let root = drive.root().await.unwrap();
        let roll = drive.folder("/root/Camera Roll").unwrap();
        let err = drive.list_page(&roll, None).await.unwrap_err();
        assert!(err.is_retryable());
        let items: Vec<_> = drive.list_children(&root).try_collect().await.unwrap();
        let item = Item::new("item-2", "a.jpg", roll.clone(), Attributes::unreadable());
        assert!(drive.relocate(&item, &root).await.is_err());
        assert_eq!(items.len(), 1);
        assert!(drive.relocations().is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_file_panics_on_bad_path() {
        let _ = MockDrive::new().with_file("/root/../escape");
    }
}
