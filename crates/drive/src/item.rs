//! Listed drive items.
//!
//! An item is created by a listing as [`Item<Discovered>`](Discovered) and
//! becomes [`Item<Classified>`](Classified) exactly once, when the rule chain
//! has run over it. Both deref to [`ItemMeta`], so code that doesn't care
//! about classification (e.g. [`Drive::relocate`](crate::Drive::relocate))
//! just takes `&ItemMeta`.

use crate::models::{Attributes, Classification, FolderHandle, Kind};
use crate::path::SEPARATOR;
use std::ops::Deref;

/// Everything the drive reported about an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemMeta {
    /// Remote identifier
    pub id: String,
    pub name: String,
    /// Folder the item was listed in
    pub parent: FolderHandle,
    pub attributes: Attributes,
}
impl ItemMeta {
    pub fn full_path(&self) -> String {
        format!("{}{SEPARATOR}{}", self.parent.full_path(), self.name)
    }

    /// The item's own folder handle, if it carries the folder marker.
    pub fn as_folder(&self) -> Option<FolderHandle> {
        self.attributes
            .is_folder()
            .then(|| FolderHandle::child_of(self.id.clone(), self.name.clone(), &self.parent))
    }
}

mod sealed {
    pub trait Sealed {}
}
pub trait ClassState: sealed::Sealed {
    type Classification;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Discovered;
impl sealed::Sealed for Discovered {}
impl ClassState for Discovered {
    type Classification = ();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classified;
impl sealed::Sealed for Classified {}
impl ClassState for Classified {
    type Classification = Classification;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item<S: ClassState = Discovered> {
    meta: ItemMeta,
    pub classification: S::Classification,
}
impl<S: ClassState> Item<S> {
    pub fn meta(&self) -> &ItemMeta {
        &self.meta
    }

    pub fn into_meta(self) -> ItemMeta {
        self.meta
    }
}
impl<S: ClassState> Deref for Item<S> {
    type Target = ItemMeta;
    fn deref(&self) -> &ItemMeta {
        &self.meta
    }
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent: FolderHandle, attributes: Attributes) -> Self {
        ItemMeta {
            id: id.into(),
            name: name.into(),
            parent,
            attributes,
        }
        .into()
    }

    pub fn classify(self, classification: Classification) -> Item<Classified> {
        Item {
            meta: self.meta,
            classification,
        }
    }
}
impl From<ItemMeta> for Item<Discovered> {
    fn from(meta: ItemMeta) -> Self {
        Self { meta, classification: () }
    }
}

impl Item<Classified> {
    pub fn kind(&self) -> Kind {
        self.classification.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_roll() -> FolderHandle {
        FolderHandle::new("roll", "Camera Roll", "/root/Pictures")
    }

    #[test]
    fn test_full_path() {
        let item = Item::new("a", "a.jpg", camera_roll(), Attributes::unreadable());
        assert_eq!(item.full_path(), "/root/Pictures/Camera Roll/a.jpg");
    }

    #[test]
    fn test_as_folder() {
        let folder = Item::new("y2014", "2014", camera_roll(), Attributes::folder());
        assert_eq!(folder.as_folder(), Some(FolderHandle::new("y2014", "2014", "/root/Pictures/Camera Roll")));
        let file = Item::new("a", "a.jpg", camera_roll(), Attributes::unreadable());
        assert_eq!(file.as_folder(), None);
    }

    #[test]
    fn test_classify_keeps_meta() {
        let item = Item::new("a", "a.jpg", camera_roll(), Attributes::unreadable());
        let meta = item.meta().clone();
        let classified = item.classify(Classification::new(Kind::Unclassified, "NoRuleMatched"));
        assert_eq!(classified.meta(), &meta);
        assert_eq!(classified.kind(), Kind::Unclassified);
    }
}
