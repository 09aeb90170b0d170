use crate::Context;
use crate::error::{ErrorKind, Result};
use crate::index::FolderIndex;
use crate::relocate::{Relocation, Summary, dispatch};
use crate::walk::walk;
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt, TryStreamExt};
use rollsort_drive::{Classified, DriveHandle, FolderHandle, Item, Kind, SEPARATOR, segments_below};
use std::collections::HashSet;
use std::pin::pin;
use tracing::{info, instrument};

/// Progress events emitted by [`relocate_stream`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete), exactly once.
/// 3. [`Skipped`](Self::Skipped), zero or more times.
/// 4. [`Planned`](Self::Planned), exactly once, after every destination
///    folder exists.
/// 5. [`Relocated`](Self::Relocated) or an `Err` of
///    [`ErrorKind::Relocate`], once per planned move, in completion order.
/// 6. [`Complete`](Self::Complete), exactly once.
///
/// Any other error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum RelocateEvent {
    Started,
    /// The source tree has been walked.
    DiscoveryComplete {
        /// Every item found below the source root, folders included.
        discovered: u64,
        /// Items accepted by the predicate.
        matched: u64,
    },
    /// The item already sits in its destination folder.
    Skipped(Item<Classified>),
    /// Every destination folder has been resolved or created.
    Planned {
        /// Distinct destination folders.
        folders: u64,
    },
    Relocated(Relocation),
    Complete,
}

/// Streams [`RelocateEvent`]s while moving every item below `source` that
/// `predicate` accepts into the same relative folder below `destination`.
///
/// An item at `{source}/2014/02/a.jpg` lands in `{destination}/2014/02`. Folder
/// items are never moved themselves (the predicate is not consulted for
/// them), but their contents are.
///
/// A walk or folder resolution failure is fatal and ends the stream. Once the
/// moves begin, a failed move is yielded as an `Err` of
/// [`ErrorKind::Relocate`] and the remaining moves carry on.
pub fn relocate_stream<'a, P>(
    drive: &'a DriveHandle,
    ctx: &'a Context,
    source: &'a FolderHandle,
    destination: &'a FolderHandle,
    predicate: P,
) -> impl Stream<Item = Result<RelocateEvent>> + 'a
where
    P: Fn(&Item<Classified>) -> bool + 'a,
{
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(RelocateEvent::Started);

        let items: Vec<Item<Classified>> = match walk(drive, ctx, source).try_collect().await {
            Ok(items) => items,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        let discovered = items.len();
        let matched: Vec<_> = items.into_iter().filter(|item| item.kind() != Kind::Folder && predicate(item)).collect();
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(RelocateEvent::DiscoveryComplete {
            discovered: u64::try_from(discovered).unwrap_or(0),
            matched: u64::try_from(matched.len()).unwrap_or(0),
        });

        let source_path = source.full_path();
        let destination_path = destination.full_path();
        let mut index = FolderIndex::new(drive.clone(), destination.clone());
        let mut folders = HashSet::new();
        let mut plan = Vec::with_capacity(matched.len());
        for item in matched {
            let parent_path = item.parent.full_path();
            let Some(target) = mirrored_path(&source_path, &destination_path, &parent_path) else {
                yield Err(exn::Exn::from(ErrorKind::Index));
                return;
            };
            if target == parent_path {
                yield Ok(RelocateEvent::Skipped(item));
                continue;
            }
            let folder = match index.resolve_or_create(&target).await.or_raise(|| ErrorKind::Index) {
                Ok(folder) => folder,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            folders.insert(folder.id.clone());
            plan.push(Relocation { item, destination: folder });
        }
        yield Ok(RelocateEvent::Planned { folders: u64::try_from(folders.len()).unwrap_or(0) });

        for await result in dispatch(drive, plan, ctx.concurrency) {
            yield result.map(RelocateEvent::Relocated);
        }

        yield Ok(RelocateEvent::Complete);
    })
}

/// Drive [`relocate_stream`] to completion.
///
/// Returns the first fatal error, otherwise a [`Summary`] in which every
/// failed move has been logged and counted.
#[instrument(skip_all, fields(source = %source.full_path(), destination = %destination.full_path()))]
pub async fn relocate<P>(
    drive: &DriveHandle,
    ctx: &Context,
    source: &FolderHandle,
    destination: &FolderHandle,
    predicate: P,
) -> Result<Summary>
where
    P: Fn(&Item<Classified>) -> bool,
{
    let mut summary = Summary::default();
    let mut events = pin!(relocate_stream(drive, ctx, source, destination, predicate));
    while let Some(event) = events.next().await {
        match event {
            Ok(RelocateEvent::DiscoveryComplete { discovered, matched }) => {
                info!(discovered, matched, "Discovery complete");
            },
            Ok(RelocateEvent::Planned { folders }) => info!(folders, "Destination folders ready"),
            Ok(RelocateEvent::Skipped(_)) => summary.skipped += 1,
            Ok(RelocateEvent::Relocated(relocation)) => summary.record(&Ok(relocation)),
            Ok(RelocateEvent::Started | RelocateEvent::Complete) => {},
            Err(e) if e.is_isolated() => summary.record(&Err(e)),
            Err(e) => return Err(e),
        }
    }
    info!(?summary, "Relocation complete");
    Ok(summary)
}

/// `parent_path` re-rooted from `source_path` onto `destination_path`.
fn mirrored_path(source_path: &str, destination_path: &str, parent_path: &str) -> Option<String> {
    let segments = segments_below(source_path, parent_path)?;
    Some(segments.iter().fold(destination_path.to_string(), |path, segment| format!("{path}{SEPARATOR}{segment}")))
}
