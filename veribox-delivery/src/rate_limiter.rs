//! Per-key rate limiting using a sliding window counter.
//!
//! Each key (a recipient address or a caller identity) gets a window of
//! recent attempt timestamps. Stale timestamps are pruned lazily whenever
//! a key is touched, so the map never needs a sweeper task.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Configuration for the sliding-window rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    ///
    /// Default: 900 (15 minutes)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Maximum attempts per key within the window.
    ///
    /// Default: 10
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

const fn default_window_secs() -> u64 {
    900
}

const fn default_max_attempts() -> usize {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Sliding-window attempt counter per arbitrary key.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_attempts: usize,
    attempts: DashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs),
            max_attempts: config.max_attempts,
            attempts: DashMap::new(),
        }
    }

    /// Whether `key` may make another attempt right now.
    ///
    /// Prunes expired timestamps for the key but records nothing; callers
    /// pair this with [`RateLimiter::record_attempt`] once the attempt is
    /// actually made.
    #[must_use]
    pub fn can_send(&self, key: &str) -> bool {
        let now = Instant::now();

        self.attempts.get_mut(key).is_none_or(|mut entry| {
            Self::prune(entry.value_mut(), now, self.window);
            entry.value().len() < self.max_attempts
        })
    }

    /// Record an attempt for `key` at the current time.
    pub fn record_attempt(&self, key: &str) {
        let now = Instant::now();

        let mut entry = self.attempts.entry(key.to_string()).or_default();
        Self::prune(entry.value_mut(), now, self.window);
        entry.value_mut().push(now);
    }

    fn prune(timestamps: &mut Vec<Instant>, now: Instant, window: Duration) {
        timestamps.retain(|stamp| now.duration_since(*stamp) < window);
    }
}
