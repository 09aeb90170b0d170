//! Breadth-first traversal of a drive subtree.

use crate::Context;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::future::ready;
use futures::{Stream, TryStreamExt};
use rollsort_drive::{Classified, DriveHandle, FolderHandle, Item, Kind};
use std::collections::VecDeque;

/// Stream every item at or below `root` (excluding `root` itself),
/// classified with `ctx`'s rule chain.
///
/// Items come out breadth first: all of a folder's children before any
/// grandchild. Every item classified as [`Kind::Folder`] is yielded *and*
/// descended into. Each listing page is fetched lazily as the consumer pulls,
/// so dropping the stream stops traversal. The first listing failure is
/// yielded as [`ErrorKind::Walk`] and ends the stream.
pub fn walk<'a>(
    drive: &'a DriveHandle,
    ctx: &'a Context,
    root: &'a FolderHandle,
) -> impl Stream<Item = Result<Item<Classified>>> + 'a {
    traverse(drive, ctx, root, true)
}

/// Like [`walk`], but only `folder`'s immediate children.
pub fn children<'a>(
    drive: &'a DriveHandle,
    ctx: &'a Context,
    folder: &'a FolderHandle,
) -> impl Stream<Item = Result<Item<Classified>>> + 'a {
    traverse(drive, ctx, folder, false)
}

/// Every item below `root` that no rule recognised.
pub fn unclassified<'a>(
    drive: &'a DriveHandle,
    ctx: &'a Context,
    root: &'a FolderHandle,
) -> impl Stream<Item = Result<Item<Classified>>> + 'a {
    walk(drive, ctx, root).try_filter(|item| ready(item.kind() == Kind::Unclassified))
}

fn traverse<'a>(
    drive: &'a DriveHandle,
    ctx: &'a Context,
    root: &'a FolderHandle,
    recursive: bool,
) -> impl Stream<Item = Result<Item<Classified>>> + 'a {
    stream!({
        let mut queue = VecDeque::from([root.clone()]);
        while let Some(folder) = queue.pop_front() {
            tracing::trace!(folder = %folder.full_path(), pending = queue.len(), "Listing folder");
            for await child in drive.list_children(&folder) {
                let child = match child.or_raise(|| ErrorKind::Walk) {
                    Ok(child) => ctx.chain.classify_item(child),
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                };
                if recursive && child.kind() == Kind::Folder {
                    queue.push_back(FolderHandle::child_of(child.id.clone(), child.name.clone(), &folder));
                }
                yield Ok(child);
            }
        }
    })
}
