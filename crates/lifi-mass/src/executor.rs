//! Fan-out executor
//!
//! Runs one task per item and waits for every one of them. The task group
//! lives exactly as long as the call; nothing persists between batches.

use std::future::Future;

use lifi_port::PortError;
use tracing::warn;

use crate::batch::BatchResult;

/// Run `op` concurrently for every `(name, item)` pair
///
/// Each item gets its own spawned task, so on a multi-threaded runtime the
/// operations run in parallel. There is no batch-level timeout and no
/// cross-task cancellation: a slow item only delays the return of this call,
/// never the completion of its peers. A task that panics is reported as
/// [`PortError::TaskFailed`] for its item only.
///
/// Must be called from within a tokio runtime.
pub async fn fan_out<I, O, F, Fut>(items: Vec<(String, I)>, op: F) -> BatchResult<O>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
{
    let tasks: Vec<_> = items
        .into_iter()
        .map(|(name, item)| (name, tokio::spawn(op(item))))
        .collect();

    let mut results = BatchResult::with_capacity(tasks.len());
    for (name, task) in tasks {
        let outcome = task.await.map_err(|e| {
            warn!("Task for {} failed: {}", name, e);
            PortError::TaskFailed {
                port: name.clone(),
                reason: e.to_string(),
            }
        });
        results.push(name, outcome);
    }
    results
}
