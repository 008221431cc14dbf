//! Type definitions for the delivery pipeline.

use serde::{Deserialize, Serialize};
use veribox_common::address::EmailAddress;

/// A verification-code delivery owned by the retry queue.
///
/// `attempts` counts completed drain cycles, not individual wire attempts:
/// every cycle runs the full backoff schedule internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendJob {
    /// Recipient mailbox.
    pub recipient: EmailAddress,
    /// Display name used in the message body.
    pub username: String,
    /// The one-time code to deliver.
    pub code: String,
    /// Completed retry cycles so far.
    pub attempts: u32,
}

impl SendJob {
    #[must_use]
    pub const fn new(recipient: EmailAddress, username: String, code: String) -> Self {
        Self {
            recipient,
            username,
            code,
            attempts: 0,
        }
    }
}

/// What the remote server said when it accepted a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Final server reply, e.g. `250 OK: queued`.
    pub response: String,
}

/// SMTP operation timeout configuration for the submission path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpTimeouts {
    /// Timeout for initial connection establishment.
    ///
    /// Default: 30 seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_secs: u64,

    /// Timeout for EHLO, MAIL FROM, RCPT TO, and QUIT.
    ///
    /// Default: 30 seconds
    #[serde(default = "default_command_timeout")]
    pub command_secs: u64,

    /// Timeout for DATA and message transmission.
    ///
    /// Longer than the command timeout to accommodate slow receivers.
    /// Default: 120 seconds
    #[serde(default = "default_data_timeout")]
    pub data_secs: u64,
}

impl Default for SmtpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_timeout(),
            command_secs: default_command_timeout(),
            data_secs: default_data_timeout(),
        }
    }
}

const fn default_connect_timeout() -> u64 {
    30
}

const fn default_command_timeout() -> u64 {
    30
}

const fn default_data_timeout() -> u64 {
    120
}
