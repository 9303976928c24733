//! Batch executor

use futures::future::join_all;
use std::time::Duration;

use super::{ProbeOutcome, Prober};
use crate::metrics;
use crate::models::Server;

/// Probe every server in `batch` concurrently and keep the online ones
///
/// All probes are started together and awaited together, so the batch takes
/// about as long as its slowest probe. The returned servers keep their
/// relative order from `batch`.
pub async fn check_batch<P>(prober: &P, batch: &[Server], timeout: Option<Duration>) -> Vec<Server>
where
    P: Prober + ?Sized,
{
    let outcomes = join_all(batch.iter().map(|server| async move {
        let online = prober.is_online(&server.url, timeout).await;
        ProbeOutcome { server, online }
    }))
    .await;

    let online: Vec<Server> = outcomes
        .into_iter()
        .filter(|outcome| outcome.online)
        .map(|outcome| outcome.server.clone())
        .collect();

    tracing::debug!(size = batch.len(), online = online.len(), "Batch settled");
    metrics::record_batch(batch.len(), online.len());

    online
}
