//! Resilient delivery pipeline for one-time verification codes.
//!
//! An inbound send is rate-checked per recipient address and per caller,
//! attempted with a fixed bounded-retry schedule, and parked in an
//! in-memory FIFO retry queue when the schedule is exhausted. A background
//! drain re-attempts one queued job per tick until each job either
//! delivers or runs out of its retry budget.

mod backoff;
mod error;
mod mailer;
mod queue;
mod rate_limiter;
mod service;
mod templates;
mod types;

pub use backoff::{BackoffPolicy, Transport, send_with_backoff};
pub use error::{SendError, TransportError};
pub use mailer::{SmtpMailer, SmtpRelayConfig};
pub use queue::{RetryQueue, RetryQueueConfig};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use service::{DeliveryConfig, DeliveryService, SendDisposition};
pub use types::{SendJob, SendReceipt, SmtpTimeouts};
