//! Ordered rule-chain classification.
//!
//! A [`Chain`] is an ordered list of pure [`Rule`]s, evaluated most specific
//! first. The first rule that matches decides the item's [`Classification`]
//! and later rules are never consulted. A catch-all rule always terminates
//! the chain, so classification cannot fail.
//!
//! ```
//! use rollsort_classify::Chain;
//! use rollsort_drive::{Attributes, FolderHandle, Item, Kind};
//!
//! let roll = FolderHandle::new("roll", "Camera Roll", "/root/Pictures");
//! let item = Item::new("a", "2014", roll, Attributes::folder());
//! let classified = Chain::default().classify_item(item);
//! assert_eq!(classified.kind(), Kind::Folder);
//! assert_eq!(classified.classification.to_string(), "Folder because HasFolderProperty");
//! ```

mod consts;
pub mod rules;

use rollsort_drive::{Classification, Classified, Item, ItemMeta};

/// A pure classification rule: a match, or `None` to defer to the next rule.
///
/// Rules must not depend on which other rules exist or in what order they
/// run; only the [`Chain`] enforces order.
pub type Rule = fn(&ItemMeta) -> Option<Classification>;

/// A [`Rule`] with a name, for tracing and introspection.
#[derive(Debug, Clone, Copy)]
pub struct NamedRule {
    pub name: &'static str,
    pub rule: Rule,
}

/// Ordered rule chain, always terminated by [`rules::catch_all`].
#[derive(Debug, Clone)]
pub struct Chain {
    rules: Vec<NamedRule>,
}
impl Chain {
    /// A chain containing only the catch-all rule.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. It is evaluated after every rule already in the chain
    /// and before the catch-all.
    pub fn then(mut self, name: &'static str, rule: Rule) -> Self {
        self.rules.push(NamedRule { name, rule });
        self
    }

    /// Rule names in evaluation order, catch-all included.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).chain([rules::CATCH_ALL]).collect()
    }

    /// Classify `item` with the first matching rule.
    pub fn classify(&self, item: &ItemMeta) -> Classification {
        for NamedRule { name, rule } in &self.rules {
            if let Some(classification) = rule(item) {
                tracing::trace!(item = %item.full_path(), rule = name, %classification, "Rule matched");
                return classification;
            }
        }
        rules::catch_all(item)
    }

    /// Classify `item` and attach the result.
    pub fn classify_item(&self, item: Item) -> Item<Classified> {
        let classification = self.classify(&item);
        item.classify(classification)
    }
}
impl Default for Chain {
    /// The built-in chain, most specific rule first.
    fn default() -> Self {
        Self::empty()
            .then("folder_marker", rules::folder_marker)
            .then("video_marker", rules::video_marker)
            .then("apple_iphone", rules::apple_iphone)
            .then("ios_screenshot", rules::ios_screenshot)
            .then("exif", rules::exif)
            .then("photo_without_exif", rules::photo_without_exif)
    }
}
