pub mod backend;
pub mod error;
pub mod item;
mod models;
mod path;

pub use crate::backend::{Drive, Recursion};
pub use crate::item::{Classified, Discovered, Item, ItemMeta};
pub use crate::models::{
    Attributes, Classification, FolderFacet, FolderHandle, Kind, Page, PageToken, PhotoFacet, VideoFacet,
};
pub use crate::path::{SEPARATOR, segments_below, validate as validate_path};
use std::sync::Arc;

pub type DriveHandle = Arc<dyn Drive + Send + Sync>;
