//! Availability orchestrator
//!
//! [`ReachabilityService`] answers "which servers are up right now":
//!
//! 1. read the full list from the [`EndpointSource`]
//! 2. keep the requested priority tier, if any
//! 3. split into batches of `batch_size`
//! 4. probe one batch at a time, every server in a batch concurrently
//! 5. concatenate survivors and stable-sort them by priority
//!
//! Batches never overlap, which caps outbound connections at `batch_size`.
//! Nothing is cached: every call probes again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::metrics;
use crate::models::{GetServersResponse, Server};
use crate::probe::{check_batch, Prober};
use crate::source::EndpointSource;

/// Outcome of one reachability check, with the bookkeeping the response drops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Response body, sorted by priority
    pub response: GetServersResponse,
    /// Servers that passed the priority filter
    pub candidates: usize,
    /// Batches executed
    pub batches: usize,
    /// Wall-clock time spent probing
    pub elapsed: Duration,
}

/// Keep servers in the requested tier; `None` keeps everything
pub fn filter_by_priority(servers: Vec<Server>, priority: Option<i64>) -> Vec<Server> {
    match priority {
        Some(_) => servers
            .into_iter()
            .filter(|s| s.matches_priority(priority))
            .collect(),
        None => servers,
    }
}

/// Split `servers` into consecutive batches of at most `limit`
///
/// With no limit the whole slice is a single batch, even when empty.
pub fn partition(servers: &[Server], limit: Option<usize>) -> Vec<&[Server]> {
    match limit {
        Some(size) => servers.chunks(size).collect(),
        None => vec![servers],
    }
}

/// Stable sort by ascending priority; ties keep their order
pub fn sort_by_priority(servers: &mut [Server]) {
    servers.sort_by_key(|s| s.priority);
}

/// Orchestrates filtering, batching and probing
#[derive(Clone)]
pub struct ReachabilityService {
    source: Arc<dyn EndpointSource>,
    prober: Arc<dyn Prober>,
    probe_config: Arc<RwLock<ProbeConfig>>,
}

impl ReachabilityService {
    pub fn new(
        source: Arc<dyn EndpointSource>,
        prober: Arc<dyn Prober>,
        probe_config: ProbeConfig,
    ) -> Self {
        Self {
            source,
            prober,
            probe_config: Arc::new(RwLock::new(probe_config)),
        }
    }

    /// Current probe configuration
    pub async fn probe_config(&self) -> ProbeConfig {
        self.probe_config.read().await.clone()
    }

    /// Replace the probe configuration
    ///
    /// Checks already running keep the values they started with.
    pub async fn update_probe_config(&self, probe_config: ProbeConfig) {
        tracing::info!(
            batch_size = probe_config.batch_size,
            server_call_timeout_ms = probe_config.server_call_timeout_ms,
            "Probe configuration updated"
        );
        *self.probe_config.write().await = probe_config;
    }

    /// Reachable servers in the requested tier, sorted by priority
    ///
    /// # Errors
    ///
    /// Only a failing endpoint source is an error. Unreachable servers are
    /// left out of the response.
    pub async fn get_reachable_servers(&self, priority: Option<i64>) -> Result<GetServersResponse> {
        Ok(self.check(priority).await?.response)
    }

    /// Same as [`get_reachable_servers`](Self::get_reachable_servers), keeping the bookkeeping
    pub async fn check(&self, priority: Option<i64>) -> Result<CheckReport> {
        let started = Instant::now();
        let _timer = metrics::start_check_timer();

        // One snapshot per call
        let probe_config = self.probe_config().await;

        let servers = self.source.servers()?;
        if servers.is_empty() {
            tracing::debug!("Server list is empty, nothing to probe");
            return Ok(CheckReport {
                response: GetServersResponse::empty(),
                candidates: 0,
                batches: 0,
                elapsed: started.elapsed(),
            });
        }

        let candidates = filter_by_priority(servers, priority);

        let limit = probe_config.batch_limit();
        if limit.is_none() {
            tracing::warn!(
                batch_size = probe_config.batch_size,
                servers = candidates.len(),
                "Batching disabled, probing every server at once"
            );
        }
        let timeout = probe_config.server_call_timeout();

        let batches = partition(&candidates, limit);
        let batch_count = batches.len();

        let mut reachable = Vec::new();
        for (index, batch) in batches.into_iter().enumerate() {
            tracing::debug!(batch = index + 1, of = batch_count, size = batch.len(), "Probing batch");
            reachable.extend(check_batch(self.prober.as_ref(), batch, timeout).await);
        }

        sort_by_priority(&mut reachable);

        let elapsed = started.elapsed();
        tracing::info!(
            priority = ?priority,
            candidates = candidates.len(),
            reachable = reachable.len(),
            batches = batch_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "Reachability check complete"
        );

        Ok(CheckReport {
            response: GetServersResponse::new(reachable),
            candidates: candidates.len(),
            batches: batch_count,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AlwaysOnline {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Prober for AlwaysOnline {
        async fn is_online(&self, _url: &str, _timeout: Option<Duration>) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn servers(n: usize) -> Vec<Server> {
        (0..n)
            .map(|i| Server::new(format!("https://github-{i}.com"), 4))
            .collect()
    }

    #[test]
    fn test_partition_sizes() {
        let list = servers(1001);
        let batches = partition(&list, Some(100));

        assert_eq!(batches.len(), 11);
        assert_eq!(batches[0].len(), 100);
        assert_eq!(batches[10].len(), 1);
    }

    #[test]
    fn test_partition_unbounded() {
        let list = servers(5);
        assert_eq!(partition(&list, None).len(), 1);
        assert_eq!(partition(&[], None).len(), 1);
        assert!(partition(&[], Some(10)).is_empty());
    }

    #[test]
    fn test_filter_by_priority() {
        let list = vec![
            Server::new("https://a.example", 1),
            Server::new("https://b.example", 4),
            Server::new("https://c.example", 4),
        ];

        assert_eq!(filter_by_priority(list.clone(), None).len(), 3);
        assert_eq!(filter_by_priority(list.clone(), Some(4)).len(), 2);
        assert!(filter_by_priority(list, Some(100)).is_empty());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut list = vec![
            Server::new("https://a.example", 4),
            Server::new("https://b.example", 1),
            Server::new("https://c.example", 4),
        ];
        sort_by_priority(&mut list);

        let urls: Vec<_> = list.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["https://b.example", "https://a.example", "https://c.example"]);
    }

    #[tokio::test]
    async fn test_empty_source_skips_probing() {
        let prober = Arc::new(AlwaysOnline {
            calls: AtomicUsize::new(0),
        });
        let service = ReachabilityService::new(
            Arc::new(StaticSource::default()),
            prober.clone(),
            ProbeConfig::default(),
        );

        let report = service.check(None).await.unwrap();

        assert!(report.response.is_empty());
        assert_eq!(report.batches, 0);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_probe_config() {
        let service = ReachabilityService::new(
            Arc::new(StaticSource::default()),
            Arc::new(AlwaysOnline {
                calls: AtomicUsize::new(0),
            }),
            ProbeConfig::default(),
        );

        service.update_probe_config(ProbeConfig::new(7, 250)).await;
        assert_eq!(service.probe_config().await, ProbeConfig::new(7, 250));
    }
}
