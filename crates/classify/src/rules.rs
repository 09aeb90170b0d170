//! Built-in rules, in the order [`Chain::default()`](crate::Chain) runs them.

use crate::consts::{APPLE_MAKE, IOS_SCREENSHOT_SUFFIX, IPHONE_MODEL_PREFIX, IPHONE_MODEL_SUFFIXES};
use rollsort_drive::{Classification, ItemMeta, Kind};

/// Name of the terminal rule every chain ends with.
pub const CATCH_ALL: &str = "catch_all";

pub fn folder_marker(item: &ItemMeta) -> Option<Classification> {
    item.attributes.folder.as_ref().map(|_| Classification::new(Kind::Folder, "HasFolderProperty"))
}

pub fn video_marker(item: &ItemMeta) -> Option<Classification> {
    item.attributes.video.as_ref().map(|_| Classification::new(Kind::Video, "HasVideoProperty"))
}

/// Photos taken by an allow-listed iPhone model. The reason names the model,
/// e.g. `iPhone11 Pro`.
pub fn apple_iphone(item: &ItemMeta) -> Option<Classification> {
    let photo = item.attributes.photo.as_ref()?;
    if photo.camera_make.as_deref() != Some(APPLE_MAKE) {
        return None;
    }
    let model = photo.camera_model.as_deref()?.strip_prefix(IPHONE_MODEL_PREFIX)?;
    IPHONE_MODEL_SUFFIXES
        .iter()
        .any(|suffix| model.ends_with(*suffix))
        .then(|| Classification::new(Kind::Photo, format!("iPhone{model}")))
}

/// Screenshots synced from iOS: no camera metadata, but a telltale filename.
pub fn ios_screenshot(item: &ItemMeta) -> Option<Classification> {
    item.attributes.photo.as_ref()?;
    item.name.ends_with(IOS_SCREENSHOT_SUFFIX).then(|| Classification::new(Kind::Photo, "iOSScreenshot"))
}

/// Any photo with capture time or exposure data.
pub fn exif(item: &ItemMeta) -> Option<Classification> {
    let photo = item.attributes.photo.as_ref()?;
    (photo.taken_at.is_some() || photo.exposure_numerator.is_some())
        .then(|| Classification::new(Kind::Photo, "HasExif"))
}

/// Photos that reached this far have lost their EXIF data, usually because a
/// messaging app re-encoded them. Only correct when placed after every other
/// photo rule.
pub fn photo_without_exif(item: &ItemMeta) -> Option<Classification> {
    item.attributes.photo.as_ref().map(|_| Classification::new(Kind::StrippedPhoto, "PhotoWithoutExif"))
}

pub fn catch_all(_item: &ItemMeta) -> Classification {
    Classification::new(Kind::Unclassified, "NoRuleMatched")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Chain;
    use rollsort_drive::{Attributes, FolderHandle, Item, PhotoFacet};
    use rstest::rstest;
    use time::macros::datetime;

    fn photo(name: &str, facet: PhotoFacet) -> ItemMeta {
        let parent = FolderHandle::new("roll", "Camera Roll", "/root/Pictures");
        Item::new("id", name, parent, Attributes::photo(facet)).into_meta()
    }

    fn camera(make: Option<&str>, model: Option<&str>) -> PhotoFacet {
        PhotoFacet {
            camera_make: make.map(Into::into),
            camera_model: model.map(Into::into),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(Some("Apple"), Some("iPhone 5"), Some("iPhone5"))]
    #[case(Some("Apple"), Some("iPhone 6"), Some("iPhone6"))]
    #[case(Some("Apple"), Some("iPhone 11 Pro"), Some("iPhone11 Pro"))]
    #[case(Some("Apple"), Some("iPhone 7"), None)]
    #[case(Some("Apple"), Some("iPad 6"), None)]
    #[case(Some("Samsung"), Some("iPhone 6"), None)]
    #[case(Some("Apple"), None, None)]
    #[case(None, Some("iPhone 6"), None)]
    fn test_apple_iphone(#[case] make: Option<&str>, #[case] model: Option<&str>, #[case] reason: Option<&str>) {
        let result = apple_iphone(&photo("IMG_0001.JPG", camera(make, model)));
        assert_eq!(result, reason.map(|r| Classification::new(Kind::Photo, r)));
    }

    #[rstest]
    #[case("20140216_194427722_iOS.png", true)]
    #[case("20140216_194427722_iOS.jpg", false)]
    #[case("Screenshot.png", false)]
    fn test_ios_screenshot(#[case] name: &str, #[case] matches: bool) {
        let result = ios_screenshot(&photo(name, PhotoFacet::default()));
        assert_eq!(result.is_some(), matches);
    }

    #[test]
    fn test_ios_screenshot_requires_photo_facet() {
        let parent = FolderHandle::new("roll", "Camera Roll", "/root/Pictures");
        let item = Item::new("id", "20140216_194427722_iOS.png", parent, Attributes::unreadable());
        assert_eq!(ios_screenshot(&item), None);
    }

    #[rstest]
    #[case(PhotoFacet { taken_at: Some(datetime!(2014-02-16 19:44 UTC)), ..Default::default() }, true)]
    #[case(PhotoFacet { exposure_numerator: Some(1.0), exposure_denominator: Some(120.0), ..Default::default() }, true)]
    #[case(PhotoFacet { exposure_denominator: Some(120.0), ..Default::default() }, false)]
    #[case(PhotoFacet::default(), false)]
    fn test_exif(#[case] facet: PhotoFacet, #[case] matches: bool) {
        assert_eq!(exif(&photo("a.jpg", facet)).is_some(), matches);
    }

    #[rstest]
    #[case(camera(Some("Apple"), Some("iPhone 6")), Kind::Photo, "iPhone6")]
    #[case(PhotoFacet::default(), Kind::StrippedPhoto, "PhotoWithoutExif")]
    #[case(PhotoFacet { taken_at: Some(datetime!(2019-07-04 12:00 UTC)), ..camera(Some("Canon"), Some("EOS 80D")) }, Kind::Photo, "HasExif")]
    fn test_default_chain_photos(#[case] facet: PhotoFacet, #[case] kind: Kind, #[case] reason: &str) {
        let result = Chain::default().classify(&photo("IMG_0001.JPG", facet));
        assert_eq!(result, Classification::new(kind, reason));
    }

    #[test]
    fn test_screenshot_beats_exif() {
        // A screenshot that also has capture time is reported by the more
        // specific filename rule.
        let facet = PhotoFacet {
            taken_at: Some(datetime!(2014-02-16 19:44 UTC)),
            ..Default::default()
        };
        let result = Chain::default().classify(&photo("20140216_194427722_iOS.png", facet));
        assert_eq!(result.reason, "iOSScreenshot");
    }
}
