//! The delivery service object.
//!
//! All process-wide mutable delivery state (attempt log, retry queue)
//! lives here as fields, constructed once at startup and torn down with
//! the process. Mutation happens in synchronous sections between await
//! points, so a read-modify-write never spans a suspension.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use veribox_common::{Signal, address::EmailAddress};

use crate::{
    backoff::{BackoffPolicy, Transport, send_with_backoff},
    error::SendError,
    mailer::{SmtpMailer, SmtpRelayConfig},
    queue::{RetryQueue, RetryQueueConfig},
    rate_limiter::{RateLimitConfig, RateLimiter},
    types::{SendJob, SendReceipt},
};

/// Configuration for the delivery pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// SMTP relay for live sending. Absent means simulation mode: sends
    /// succeed immediately and nothing touches the network or the queue.
    #[serde(default)]
    pub smtp: Option<SmtpRelayConfig>,

    /// Per-key rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry schedule for a single send call.
    #[serde(default)]
    pub backoff: BackoffPolicy,

    /// Retry queue drain settings.
    #[serde(default)]
    pub queue: RetryQueueConfig,
}

/// How one `send_code` call concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendDisposition {
    /// The relay accepted the message.
    Sent(SendReceipt),
    /// Delivery is unconfigured; nothing was sent.
    Simulated,
    /// Every attempt failed; the job now sits in the retry queue.
    Queued,
}

/// Owns the rate limiter, retry queue, and transport.
pub struct DeliveryService {
    limiter: RateLimiter,
    queue: RetryQueue,
    backoff: BackoffPolicy,
    drain_interval: Duration,
    retry_limit: u32,
    transport: Option<Arc<dyn Transport>>,
}

impl DeliveryService {
    /// Build the service from configuration, constructing a live SMTP
    /// transport when a relay is configured.
    #[must_use]
    pub fn new(config: DeliveryConfig) -> Self {
        let transport = config
            .smtp
            .map(|relay| Arc::new(SmtpMailer::new(relay)) as Arc<dyn Transport>);

        Self {
            limiter: RateLimiter::new(&config.rate_limit),
            queue: RetryQueue::new(),
            backoff: config.backoff,
            drain_interval: Duration::from_secs(config.queue.drain_interval_secs),
            retry_limit: config.queue.retry_limit,
            transport,
        }
    }

    /// Build the service with an explicit transport (or none, for
    /// simulation). Lets tests substitute the wire.
    #[must_use]
    pub fn with_transport(config: &DeliveryConfig, transport: Option<Arc<dyn Transport>>) -> Self {
        Self {
            limiter: RateLimiter::new(&config.rate_limit),
            queue: RetryQueue::new(),
            backoff: config.backoff.clone(),
            drain_interval: Duration::from_secs(config.queue.drain_interval_secs),
            retry_limit: config.queue.retry_limit,
            transport,
        }
    }

    /// Whether a relay is configured for live sending.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.transport.is_some()
    }

    /// Number of jobs currently parked in the retry queue.
    #[must_use]
    pub fn queued_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Rate-check and deliver one verification code.
    ///
    /// The recipient address and the caller identity are independent rate
    /// limit keys; both must pass, and both are charged together.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::RateLimited`] when either key is over its cap.
    pub async fn send_code(
        &self,
        recipient: EmailAddress,
        username: &str,
        code: &str,
        caller: &str,
    ) -> Result<SendDisposition, SendError> {
        let address_key = recipient.to_string();

        if !self.limiter.can_send(&address_key) {
            return Err(SendError::RateLimited { key: address_key });
        }
        if !self.limiter.can_send(caller) {
            return Err(SendError::RateLimited {
                key: caller.to_string(),
            });
        }
        self.limiter.record_attempt(&address_key);
        self.limiter.record_attempt(caller);

        let Some(transport) = self.transport.as_deref() else {
            info!(recipient = %address_key, "delivery unconfigured, simulating send");
            return Ok(SendDisposition::Simulated);
        };

        let job = SendJob::new(recipient, username.to_string(), code.to_string());

        match send_with_backoff(transport, &job, &self.backoff).await {
            Ok(receipt) => {
                info!(
                    recipient = %job.recipient,
                    response = %receipt.response,
                    "verification code delivered"
                );
                Ok(SendDisposition::Sent(receipt))
            }
            Err(error) => {
                warn!(
                    recipient = %job.recipient,
                    error = %error,
                    "delivery failed, parking job in retry queue"
                );
                self.queue.enqueue(job);
                Ok(SendDisposition::Queued)
            }
        }
    }

    /// Run the periodic retry queue drain until shutdown.
    ///
    /// At most one job is drained per tick. That bounds the outbound send
    /// rate under backlog; it is backpressure, not an oversight. In
    /// simulation mode the queue is inert and this returns immediately.
    pub async fn serve(&self, mut shutdown: broadcast::Receiver<Signal>) {
        if self.transport.is_none() {
            debug!("delivery unconfigured, retry queue drain not started");
            return;
        }

        info!(
            interval_secs = self.drain_interval.as_secs(),
            "retry queue drain starting"
        );

        let mut timer = tokio::time::interval(self.drain_interval);
        // The first tick completes immediately; skip it so a fresh queue
        // is not drained at startup.
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.drain_one().await;
                }
                _ = shutdown.recv() => {
                    info!("retry queue drain stopping");
                    break;
                }
            }
        }
    }

    /// Drain the oldest queued job, if any.
    async fn drain_one(&self) {
        let Some(transport) = self.transport.as_deref() else {
            return;
        };
        let Some(mut job) = self.queue.pop() else {
            return;
        };

        if job.attempts >= self.retry_limit {
            // The drop must be observable, never silent.
            warn!(
                recipient = %job.recipient,
                attempts = job.attempts,
                retry_limit = self.retry_limit,
                "retry budget exhausted, dropping queued delivery"
            );
            return;
        }

        match send_with_backoff(transport, &job, &self.backoff).await {
            Ok(receipt) => {
                info!(
                    recipient = %job.recipient,
                    response = %receipt.response,
                    "queued delivery succeeded"
                );
            }
            Err(error) => {
                job.attempts += 1;
                warn!(
                    recipient = %job.recipient,
                    attempts = job.attempts,
                    error = %error,
                    "queued delivery failed, re-queueing at the tail"
                );
                self.queue.enqueue(job);
            }
        }
    }
}
