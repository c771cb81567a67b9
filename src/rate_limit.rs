use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info};

use crate::metrics::TRACKED_CLIENTS;

// Both windows read the same timestamp list
pub const SHORT_WINDOW: Duration = Duration::from_secs(60);
pub const SHORT_WINDOW_LIMIT: usize = 3;
pub const LONG_WINDOW: Duration = Duration::from_secs(5 * 60);
pub const LONG_WINDOW_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub short_window: Duration,
    pub short_limit: usize,
    pub long_window: Duration,
    pub long_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            short_window: SHORT_WINDOW,
            short_limit: SHORT_WINDOW_LIMIT,
            long_window: LONG_WINDOW,
            long_limit: LONG_WINDOW_LIMIT,
        }
    }
}

// Admitted request timestamps for one client, oldest first
#[derive(Debug, Default)]
pub struct ClientWindow {
    requests: VecDeque<Instant>,
}

impl ClientWindow {
    // Drop everything that fell out of the retention window
    fn purge(&mut self, now: Instant, retention: Duration) {
        while let Some(&oldest) = self.requests.front() {
            if now.saturating_duration_since(oldest) < retention {
                break;
            }
            self.requests.pop_front();
        }
    }

    fn count_within(&self, now: Instant, window: Duration) -> usize {
        self.requests
            .iter()
            .rev()
            .take_while(|at| now.saturating_duration_since(**at) < window)
            .count()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    #[cfg(test)]
    fn last_seen(&self) -> Option<Instant> {
        self.requests.back().copied()
    }
}

// Client windows keyed by identifier. Built once in main, never persisted.
// entry() holds the shard lock across lookup, purge, count and append.
pub struct RateGovernor {
    clients: DashMap<String, ClientWindow>,
    limits: Limits,
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl RateGovernor {
    pub fn new(limits: Limits) -> Self {
        Self {
            clients: DashMap::new(),
            limits,
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn is_allowed(&self, identifier: &str) -> bool {
        self.is_allowed_at(identifier, Instant::now())
    }

    // Rejection records nothing; only expired timestamps get dropped
    pub fn is_allowed_at(&self, identifier: &str, now: Instant) -> bool {
        let mut window = match self.clients.entry(identifier.to_string()) {
            Entry::Occupied(entry) => entry.into_ref(),
            Entry::Vacant(entry) => {
                TRACKED_CLIENTS.inc();
                entry.insert(ClientWindow::default())
            }
        };

        window.purge(now, self.limits.long_window);
        let recent = window.count_within(now, self.limits.short_window);

        if recent >= self.limits.short_limit || window.len() >= self.limits.long_limit {
            return false;
        }

        window.requests.push_back(now);
        true
    }

    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    // Drops windows with no live timestamps, so clients idle for a whole long
    // window go too. Shards are locked one at a time.
    pub fn cleanup_at(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.clients.retain(|_, window| {
            window.purge(now, self.limits.long_window);
            if window.is_empty() {
                removed += 1;
                false
            } else {
                true
            }
        });
        TRACKED_CLIENTS.set(self.clients.len() as f64);
        removed
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    pub fn pending_requests(&self, identifier: &str) -> usize {
        self.clients
            .get(identifier)
            .map(|window| window.len())
            .unwrap_or(0)
    }
}

// Periodic sweep - runs on its own timer, off the request path
pub async fn cleanup_sweeper(governor: Arc<RateGovernor>, every: Duration) {
    let mut interval = interval(every);

    info!(interval = ?every, "Rate limit sweeper started");

    loop {
        interval.tick().await;

        let removed = governor.cleanup();
        let remaining = governor.tracked_clients();

        debug!(removed, remaining, "Rate limit sweep finished");
    }
}
