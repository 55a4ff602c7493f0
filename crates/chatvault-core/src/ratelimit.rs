//! Fixed-window request limiter keyed by client address.
//!
//! Each key owns a window that opens on its first request and lasts
//! `window`. Up to `max_requests` requests are admitted per window; the next
//! request after the window has elapsed opens a fresh one. Windows are held
//! in a sharded `DashMap` and updated under the entry lock, so concurrent
//! requests from the same address never lose a count.

use std::hash::Hash;
use std::net::IpAddr;
use std::time::Duration;

use chatvault_types::config::RateLimitConfig;
use chatvault_types::error::RateLimitExceeded;
use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Per-key fixed-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter<K: Eq + Hash = IpAddr> {
    max_requests: u32,
    window: Duration,
    windows: DashMap<K, Window>,
}

impl<K: Eq + Hash> RateLimiter<K> {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request for `key`, or reject it with the time left in the window.
    ///
    /// Rejected requests do not count against the quota.
    pub fn check(&self, key: K) -> Result<(), RateLimitExceeded> {
        let now = Instant::now();
        let mut entry = self.windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        let window = entry.value_mut();

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            let remaining = self.window.saturating_sub(now.duration_since(window.started));
            return Err(RateLimitExceeded {
                retry_after_secs: ceil_secs(remaining),
            });
        }

        window.count += 1;
        Ok(())
    }

    /// Drop windows that have fully elapsed. Returns how many were removed.
    ///
    /// An elapsed window would be reset on the key's next request anyway, so
    /// pruning never changes an admission decision.
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of keys currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    secs.max(1)
}
