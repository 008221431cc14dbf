//! Bounded-retry wrapper around a single send attempt.
//!
//! The schedule is fixed rather than exponential: a verification code is
//! only useful for a few minutes, so there is no point spreading attempts
//! over hours the way a general-purpose MTA would.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::TransportError,
    types::{SendJob, SendReceipt},
};

/// Something that can push one message onto the wire.
///
/// The production implementation is [`crate::SmtpMailer`]; tests substitute
/// counting or failing mocks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempt one delivery of `job`.
    async fn send(&self, job: &SendJob) -> Result<SendReceipt, TransportError>;
}

/// Retry schedule for a single [`send_with_backoff`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Total attempts per call, including the first.
    ///
    /// Default: 3
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts, in milliseconds, indexed by the attempt
    /// that just failed. Attempts beyond the schedule reuse the last entry.
    ///
    /// Default: [1000, 3000, 7000]
    #[serde(default = "default_delays_ms")]
    pub delays_ms: Vec<u64>,
}

const fn default_max_attempts() -> u32 {
    3
}

fn default_delays_ms() -> Vec<u64> {
    vec![1000, 3000, 7000]
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delays_ms: default_delays_ms(),
        }
    }
}

impl BackoffPolicy {
    /// Delay to sleep after the given 1-based failed attempt.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> std::time::Duration {
        let index = (attempt.saturating_sub(1) as usize).min(self.delays_ms.len().saturating_sub(1));
        let millis = self.delays_ms.get(index).copied().unwrap_or_default();
        std::time::Duration::from_millis(millis)
    }
}

/// Attempt delivery of `job` up to `policy.max_attempts` times.
///
/// Returns the first successful receipt, or the last error once the
/// schedule is exhausted. Failed attempts are not queued here — parking
/// the job is the caller's decision.
///
/// # Errors
///
/// Returns the final [`TransportError`] when every attempt failed.
pub async fn send_with_backoff(
    transport: &dyn Transport,
    job: &SendJob,
    policy: &BackoffPolicy,
) -> Result<SendReceipt, TransportError> {
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match transport.send(job).await {
            Ok(receipt) => return Ok(receipt),
            Err(error) => {
                warn!(
                    recipient = %job.recipient,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %error,
                    "delivery attempt failed"
                );
                last_error = Some(error);
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay_after(attempt)).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| TransportError::Protocol("no delivery attempts were made".to_string())))
}
