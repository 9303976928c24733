//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use reachable::probe::Prober;
use reachable::Server;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Prober that records what it was asked and answers from a fixed set
///
/// Every URL is online unless listed in `offline`. An optional delay keeps
/// probes in flight long enough to measure concurrency.
#[derive(Default)]
pub struct RecordingProber {
    offline: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    timeouts: Mutex<Vec<Option<Duration>>>,
}

impl RecordingProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offline<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.offline = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn timeouts(&self) -> Vec<Option<Duration>> {
        self.timeouts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for RecordingProber {
    async fn is_online(&self, url: &str, timeout: Option<Duration>) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.timeouts.lock().unwrap().push(timeout);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        !self.offline.contains(url)
    }
}

/// `n` servers at priority 4 with distinct URLs
pub fn numbered_servers(n: usize) -> Vec<Server> {
    (0..n)
        .map(|idx| Server::new(format!("https://github-{idx}.com"), 4))
        .collect()
}

/// Mixed-priority list used across several tests
pub fn mixed_servers() -> Vec<Server> {
    vec![
        Server::new("https://does-not-work.perfume.new", 1),
        Server::new("https://gitlab.com", 4),
        Server::new("https://github.com", 4),
        Server::new("http://app.scnt.me", 3),
    ]
}
