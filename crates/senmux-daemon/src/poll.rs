//! Readiness multiplexing over the connected source set.
//!
//! Mirrors a classic bounded `select(2)` wait: block until at least one
//! stream is readable or the timeout elapses, then report the ready subset.
//! The descriptor set is rebuilt from the live handles every call, so slots
//! may connect and drop between polls freely.

use std::io;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::select_all;
use tokio::time::timeout;

use crate::source::DataSource;

/// Wait up to `wait` for any connected source to become readable.
///
/// Returns the indices of ready sources (possibly spuriously ready; the
/// subsequent non-blocking read treats that as no-update), or an empty set
/// on timeout. An error from the wait itself is fatal and is returned to
/// the caller.
pub async fn poll_ready(sources: &[DataSource], wait: Duration) -> io::Result<Vec<usize>> {
    let mut waits = Vec::new();
    for (index, source) in sources.iter().enumerate() {
        if let Some(stream) = source.stream() {
            waits.push(async move { (index, stream.readable().await) }.boxed());
        }
    }

    // Nothing connected: still honor the bound so reconnect attempts keep
    // the same cadence instead of spinning.
    if waits.is_empty() {
        tokio::time::sleep(wait).await;
        return Ok(Vec::new());
    }

    match timeout(wait, select_all(waits)).await {
        Err(_) => Ok(Vec::new()),
        Ok(((first, result), _, rest)) => {
            result?;
            let mut ready = vec![first];
            // Pick up any other stream that is already readable right now.
            for fut in rest {
                if let Some((index, result)) = fut.now_or_never() {
                    result?;
                    ready.push(index);
                }
            }
            ready.sort_unstable();
            Ok(ready)
        }
    }
}
