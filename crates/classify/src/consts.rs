/// Camera make reported by Apple devices.
pub(crate) const APPLE_MAKE: &str = "Apple";
/// Model prefix shared by every iPhone.
pub(crate) const IPHONE_MODEL_PREFIX: &str = "iPhone ";
/// iPhone models (by suffix after [`IPHONE_MODEL_PREFIX`]) treated as the
/// owner's own devices.
pub(crate) const IPHONE_MODEL_SUFFIXES: &[&str] = &["5", "6", "11 Pro"];
/// Filename suffix iOS gives to screenshots once synced.
pub(crate) const IOS_SCREENSHOT_SUFFIX: &str = "_iOS.png";
