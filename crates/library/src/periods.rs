//! Period folder scaffolding.

use crate::Context;
use crate::error::{ErrorKind, Result};
use crate::index::FolderIndex;
use exn::ResultExt;
use rollsort_drive::{DriveHandle, FolderHandle, SEPARATOR};
use tracing::{debug, info, instrument};

/// Make sure every year folder directly below `root` holds one folder per
/// configured period (`01` to `12` by default).
///
/// Only missing period folders are created, years in name order and periods
/// in configured order. Returns the folders that were created.
#[instrument(skip_all, fields(root = %root.full_path()))]
pub async fn fill_periods(drive: &DriveHandle, ctx: &Context, root: &FolderHandle) -> Result<Vec<FolderHandle>> {
    let mut index = FolderIndex::new(drive.clone(), root.clone());
    let years = index.children(&root.full_path()).await.or_raise(|| ErrorKind::Periods)?;
    let mut created = Vec::new();
    for year in years {
        let year_path = year.full_path();
        for period in &ctx.periods {
            let path = format!("{year_path}{SEPARATOR}{period}");
            if index.get(&path).await.or_raise(|| ErrorKind::Periods)?.is_some() {
                debug!(path = %path, "Period folder exists");
                continue;
            }
            created.push(index.resolve_or_create(&path).await.or_raise(|| ErrorKind::Periods)?);
        }
    }
    info!(created = created.len(), "Period folders filled");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollsort_drive::backend::MockDrive;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_creates_only_missing_periods_in_order() {
        let mock = Arc::new(
            MockDrive::new()
                .with_folder("/root/iPhone/2014/01")
                .with_folder("/root/iPhone/2014/03")
                .with_folder("/root/iPhone/2015")
                .with_file("/root/iPhone/readme.txt"),
        );
        let drive: DriveHandle = mock.clone();
        let root = mock.folder("/root/iPhone").unwrap();
        let ctx = Context {
            periods: vec!["01".into(), "02".into(), "03".into()],
            ..Context::default()
        };
        let created = fill_periods(&drive, &ctx, &root).await.unwrap();
        assert_eq!(
            mock.created(),
            ["/root/iPhone/2014/02", "/root/iPhone/2015/01", "/root/iPhone/2015/02", "/root/iPhone/2015/03"]
        );
        assert_eq!(created.len(), 4);
        assert_eq!(mock.folder_listings(), 1);
    }

    #[tokio::test]
    async fn test_default_periods_and_idempotence() {
        let mock = Arc::new(MockDrive::new().with_folder("/root/iPhone/2020"));
        let drive: DriveHandle = mock.clone();
        let root = mock.folder("/root/iPhone").unwrap();
        let ctx = Context::default();
        assert_eq!(fill_periods(&drive, &ctx, &root).await.unwrap().len(), 12);
        assert_eq!(mock.created().first().map(String::as_str), Some("/root/iPhone/2020/01"));
        assert_eq!(mock.created().last().map(String::as_str), Some("/root/iPhone/2020/12"));
        assert!(fill_periods(&drive, &ctx, &root).await.unwrap().is_empty());
        assert_eq!(mock.created().len(), 12);
    }

    #[tokio::test]
    async fn test_period_blocked_by_file() {
        let mock = Arc::new(MockDrive::new().with_file("/root/iPhone/2020/01"));
        let drive: DriveHandle = mock.clone();
        let root = mock.folder("/root/iPhone").unwrap();
        let err = fill_periods(&drive, &Context::default(), &root).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Periods));
    }
}
