use crate::error::{ErrorKind, Result};
use crate::relocate::Relocation;
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use rollsort_drive::DriveHandle;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Run every planned relocation with at most `limit` outstanding at once,
/// yielding each outcome as it completes.
///
/// A failed move is yielded as [`ErrorKind::Relocate`] and does not stop the
/// rest of the plan.
pub(crate) fn dispatch<'a>(
    drive: &'a DriveHandle,
    plan: Vec<Relocation>,
    limit: usize,
) -> impl Stream<Item = Result<Relocation>> + 'a {
    stream!({
        let mut pending = VecDeque::from(plan);
        let mut processing = FuturesUnordered::new();
        while processing.len() < limit.max(1)
            && let Some(next) = pending.pop_front()
        {
            processing.push(relocate_one(drive, next));
        }
        while let Some(result) = processing.next().await {
            yield result;
            // Pop-n-push, FIFO.
            if let Some(next) = pending.pop_front() {
                processing.push(relocate_one(drive, next));
            }
        }
    })
}

async fn relocate_one(drive: &DriveHandle, relocation: Relocation) -> Result<Relocation> {
    let from = relocation.item.full_path();
    match drive.relocate(&relocation.item, &relocation.destination).await {
        Ok(()) => {
            debug!(from = %from, to = %relocation.destination.full_path(), "Relocated item");
            Ok(relocation)
        },
        Err(e) => {
            warn!(from = %from, to = %relocation.destination.full_path(), error = ?e, "Could not relocate item");
            Err(e).or_raise(|| ErrorKind::Relocate(from))
        },
    }
}
