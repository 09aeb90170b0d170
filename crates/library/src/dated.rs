//! Sort items into `{year}/{month}` folders by the date at the start of
//! their name (`20140216_194427722_iOS.png` belongs in `2014/02`).
//!
//! Unlike [`relocate`](crate::relocate()), this never creates folders: an item
//! whose month folder does not exist yet is left alone. Run
//! [`fill_periods`](crate::fill_periods()) first to make sure it does.

use crate::Context;
use crate::error::{ErrorKind, Result};
use crate::index::FolderIndex;
use crate::relocate::{Relocation, Summary, dispatch};
use crate::walk::walk;
use exn::ResultExt;
use futures::{StreamExt, TryStreamExt};
use regex::Regex;
use rollsort_drive::{Classified, DriveHandle, FolderHandle, Item, Kind, SEPARATOR};
use std::pin::pin;
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

static DATED_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})(0[1-9]|1[0-2])(\d{2})_").unwrap());

/// `{library_root}/{year}/{month}` for a dated name, if it is one.
pub fn dated_target(library_root: &str, name: &str) -> Option<String> {
    let captures = DATED_NAME.captures(name)?;
    Some(format!("{library_root}{SEPARATOR}{}{SEPARATOR}{}", &captures[1], &captures[2]))
}

/// Move every dated item below `search_root` into its month folder below
/// `library_root`.
///
/// Items already in place, and items whose month folder is missing, are
/// counted as [`skipped`](Summary::skipped).
#[instrument(skip_all, fields(library = %library_root.full_path(), search = %search_root.full_path()))]
pub async fn sort_by_filename_date(
    drive: &DriveHandle,
    ctx: &Context,
    library_root: &FolderHandle,
    search_root: &FolderHandle,
) -> Result<Summary> {
    let items: Vec<Item<Classified>> = walk(drive, ctx, search_root).try_collect::<Vec<_>>().await.or_raise(|| ErrorKind::Dated)?;
    let library_path = library_root.full_path();
    let mut index = FolderIndex::new(drive.clone(), library_root.clone());
    let mut summary = Summary::default();
    let mut plan = Vec::new();
    for item in items.into_iter().filter(|item| item.kind() != Kind::Folder) {
        let Some(target) = dated_target(&library_path, &item.name) else {
            continue;
        };
        if item.parent.full_path() == target {
            debug!(path = %item.full_path(), "Already sorted");
            summary.skipped += 1;
            continue;
        }
        match index.get(&target).await.or_raise(|| ErrorKind::Dated)? {
            Some(destination) => plan.push(Relocation { item, destination }),
            None => {
                warn!(path = %item.full_path(), target = %target, "Destination folder not found");
                summary.skipped += 1;
            },
        }
    }

    let mut outcomes = pin!(dispatch(drive, plan, ctx.concurrency));
    while let Some(outcome) = outcomes.next().await {
        summary.record(&outcome);
    }
    info!(?summary, "Dated sort complete");
    Ok(summary)
}
