//! Logical path validation.
//!
//! Drive paths are `/`-separated strings built from folder names, starting at
//! the drive root (`"/root/Pictures/Camera Roll"`). They are never resolved
//! against a local filesystem, so [`std::path::Path`] is deliberately not used:
//! folder names may legally contain characters a local platform would treat
//! specially.

use crate::error::{ErrorKind, Result};

/// Separator between folder names in a logical path.
pub const SEPARATOR: char = '/';

/// Validates a logical full path and returns its normalized form.
///
/// A valid path is absolute (starts with [`SEPARATOR`]) and every segment is
/// a non-empty folder name other than `.` or `..`. A single trailing separator
/// is tolerated and stripped. Null bytes are rejected.
///
/// # Examples
///
/// ```
/// use rollsort_drive::validate_path;
/// assert_eq!(validate_path("/root/Pictures/").unwrap(), "/root/Pictures");
/// assert!(validate_path("root/Pictures").is_err());
/// assert!(validate_path("/root//Pictures").is_err());
/// assert!(validate_path("/root/../etc").is_err());
/// ```
pub fn validate(path: impl AsRef<str>) -> Result<String> {
    let raw = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(raw.to_string());
    let Some(rest) = raw.strip_prefix(SEPARATOR) else {
        exn::bail!(invalid());
    };
    let rest = rest.strip_suffix(SEPARATOR).unwrap_or(rest);
    if rest.is_empty() {
        exn::bail!(invalid());
    }
    for segment in rest.split(SEPARATOR) {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\0') {
            exn::bail!(invalid());
        }
    }
    Ok(format!("{SEPARATOR}{rest}"))
}

/// Returns the segments of `path` below `root`, or `None` if `path` is not
/// inside `root`.
///
/// Both arguments are expected to be normalized (see [`validate`]). The root
/// itself yields an empty list. Matching is segment-aware: `/root/Pic` is not
/// inside `/root/Pictures`, and vice versa.
pub fn segments_below<'a>(root: &str, path: &'a str) -> Option<Vec<&'a str>> {
    let rest = path.strip_prefix(root)?;
    if rest.is_empty() {
        return Some(Vec::new());
    }
    let rest = rest.strip_prefix(SEPARATOR)?;
    Some(rest.split(SEPARATOR).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/root", "/root")]
    #[case("/root/", "/root")]
    #[case("/root/Pictures/Camera Roll", "/root/Pictures/Camera Roll")]
    #[case("/root/Pictures/2014/02/", "/root/Pictures/2014/02")]
    fn test_valid_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("//")]
    #[case("root/Pictures")]
    #[case("/root//Pictures")]
    #[case("/root/./Pictures")]
    #[case("/root/../etc")]
    #[case("/root/a\0b")]
    fn test_invalid_paths(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(p) if p == input));
    }

    #[test]
    fn test_segments_below() {
        assert_eq!(segments_below("/root/iPhone", "/root/iPhone/2014/02"), Some(vec!["2014", "02"]));
        assert_eq!(segments_below("/root/iPhone", "/root/iPhone"), Some(vec![]));
        assert_eq!(segments_below("/root/iPhone", "/root/iPhoneX/2014"), None);
        assert_eq!(segments_below("/root/iPhone", "/root/Camera Roll/2014"), None);
    }
}
