//! Sequential queue
//!
//! UI automation against one browser session cannot run two interactions at
//! once, so items are processed strictly one after another.

use std::future::Future;
use tracing::{debug, warn};

/// Run `worker` once per item, starting the next item only after the previous
/// worker settled.
///
/// The first error ends the queue: remaining items are never handed to the
/// worker and the error is returned as-is.
pub async fn for_each_sequential<I, F, Fut, E>(items: I, mut worker: F) -> Result<(), E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut processed = 0usize;
    for item in items {
        if let Err(err) = worker(item).await {
            warn!(item = processed, "sequential queue stopped on error");
            return Err(err);
        }
        processed += 1;
    }
    debug!(processed, "sequential queue drained");
    Ok(())
}
