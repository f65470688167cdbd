//! Fan-out with per-item isolation
//!
//! All sub-fetches are started together and awaited as a group on the
//! current task, so the wall-clock cost is the slowest single fetch. Results
//! are matched to their inputs by position, never by completion order.

use futures::future::join_all;
use std::fmt;
use std::future::Future;

use super::FetchError;

/// Run every keyed fetch concurrently and keep the ones that succeeded,
/// in input order. Failures are logged and dropped.
pub async fn join_successes<K, T, Fut, I>(tasks: I) -> Vec<(K, T)>
where
    I: IntoIterator<Item = (K, Fut)>,
    K: fmt::Display,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let pending = tasks.into_iter().map(|(key, task)| async move {
        let result = task.await;
        (key, result)
    });

    join_all(pending)
        .await
        .into_iter()
        .filter_map(|(key, result)| match result {
            Ok(value) => Some((key, value)),
            Err(err) => {
                log::warn!("Skipping {}: {}", key, err);
                None
            }
        })
        .collect()
}
