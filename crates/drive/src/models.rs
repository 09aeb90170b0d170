//! Drive models.
//!
//! Value types reported by a [`Drive`](crate::Drive): folder handles, the
//! metadata bag attached to every listed item, and the classification the
//! rule chain attaches to it.

use crate::item::Item;
use crate::path::SEPARATOR;
use derive_more::Display;
use time::OffsetDateTime;

/// A resolved remote folder.
///
/// Identity is the remote [`id`](Self::id); logical position is
/// [`full_path()`](Self::full_path). Handles are immutable and cheap enough to
/// clone freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderHandle {
    /// Remote identifier
    pub id: String,
    /// Folder name (a single path segment)
    pub name: String,
    /// Full path of the parent folder; empty for the drive root
    pub parent_path: String,
}
impl FolderHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_path: parent_path.into(),
        }
    }

    /// Create a handle for a child of `parent`.
    pub fn child_of(id: impl Into<String>, name: impl Into<String>, parent: &FolderHandle) -> Self {
        Self::new(id, name, parent.full_path())
    }

    pub fn full_path(&self) -> String {
        format!("{}{SEPARATOR}{}", self.parent_path, self.name)
    }
}

/// Marker facet: the item is a folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderFacet {
    pub child_count: Option<u64>,
}

/// Marker facet: the item is a video.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoFacet {
    pub duration_ms: Option<u64>,
}

/// Photo metadata, as far as the drive could extract it.
///
/// Every field is optional: screenshots and images re-encoded by messaging
/// apps commonly have none of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoFacet {
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub taken_at: Option<OffsetDateTime>,
    pub exposure_numerator: Option<f64>,
    pub exposure_denominator: Option<f64>,
}

/// Metadata bag reported by the drive for a listed item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub folder: Option<FolderFacet>,
    pub video: Option<VideoFacet>,
    pub photo: Option<PhotoFacet>,
    pub size: Option<u64>,
}
impl Attributes {
    /// Metadata for a child whose attributes could not be read. The item is
    /// still listed; it will simply fall through to the catch-all rule.
    pub fn unreadable() -> Self {
        Self::default()
    }

    pub fn folder() -> Self {
        Self {
            folder: Some(FolderFacet::default()),
            ..Self::default()
        }
    }

    pub fn video() -> Self {
        Self {
            video: Some(VideoFacet::default()),
            ..Self::default()
        }
    }

    pub fn photo(photo: PhotoFacet) -> Self {
        Self {
            photo: Some(photo),
            ..Self::default()
        }
    }

    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

/// Category inferred for an item by the rule chain.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Kind {
    Folder,
    File,
    Photo,
    /// A photo with its EXIF data stripped (typically re-encoded by a
    /// messaging app).
    StrippedPhoto,
    Video,
    Unclassified,
}

/// The kind assigned to an item, and the rule-specific reason for it.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{kind} because {reason}")]
pub struct Classification {
    pub kind: Kind,
    pub reason: String,
}
impl Classification {
    pub fn new(kind: Kind, reason: impl Into<String>) -> Self {
        Self { kind, reason: reason.into() }
    }
}

/// Opaque continuation token for paginated listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken(pub String);

/// One page of a folder's immediate children.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Item>,
    /// Token for the following page; `None` when this is the last one.
    pub next: Option<PageToken>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path() {
        let root = FolderHandle::new("root-id", "root", "");
        assert_eq!(root.full_path(), "/root");
        let pictures = FolderHandle::child_of("pic-id", "Pictures", &root);
        assert_eq!(pictures.full_path(), "/root/Pictures");
        let roll = FolderHandle::child_of("roll-id", "Camera Roll", &pictures);
        assert_eq!(roll.parent_path, "/root/Pictures");
        assert_eq!(roll.full_path(), "/root/Pictures/Camera Roll");
    }

    #[test]
    fn test_classification_display() {
        let c = Classification::new(Kind::Photo, "HasExif");
        assert_eq!(c.to_string(), "Photo because HasExif");
    }

    #[test]
    fn test_unreadable_has_no_markers() {
        let attributes = Attributes::unreadable();
        assert!(!attributes.is_folder());
        assert!(attributes.video.is_none());
        assert!(attributes.photo.is_none());
    }
}
