//! In-memory FIFO queue of failed send jobs.
//!
//! Jobs live here between drain cycles. The queue itself knows nothing
//! about transports or budgets — [`crate::DeliveryService`] drives it.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::SendJob;

/// Configuration for the retry queue drain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryQueueConfig {
    /// Seconds between drain ticks.
    ///
    /// Default: 60
    #[serde(default = "default_drain_interval_secs")]
    pub drain_interval_secs: u64,

    /// Drain cycles a job may consume before being dropped.
    ///
    /// Default: 3
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

const fn default_drain_interval_secs() -> u64 {
    60
}

const fn default_retry_limit() -> u32 {
    3
}

impl Default for RetryQueueConfig {
    fn default() -> Self {
        Self {
            drain_interval_secs: default_drain_interval_secs(),
            retry_limit: default_retry_limit(),
        }
    }
}

/// FIFO queue of [`SendJob`]s awaiting another delivery cycle.
#[derive(Debug, Default)]
pub struct RetryQueue {
    jobs: Mutex<VecDeque<SendJob>>,
}

impl RetryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job at the tail.
    pub fn enqueue(&self, job: SendJob) {
        self.jobs.lock().push_back(job);
    }

    /// Remove and return the oldest job, if any.
    pub fn pop(&self) -> Option<SendJob> {
        self.jobs.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}
