//! Live SMTP submission to the configured relay.
//!
//! One [`Transport::send`] call is one complete SMTP transaction: connect,
//! greeting, EHLO, MAIL FROM, RCPT TO, DATA, QUIT. Every step runs under
//! its own timeout so a wedged relay fails the attempt instead of hanging
//! the pipeline.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use veribox_smtp::client::{MessageBuilder, Response, SmtpClient};

use crate::{
    backoff::Transport,
    error::TransportError,
    templates,
    types::{SendJob, SendReceipt, SmtpTimeouts},
};

/// Configuration for the SMTP relay used for live sending.
///
/// The presence of this section in the service configuration is what
/// switches delivery from simulation to live mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpRelayConfig {
    /// Relay hostname or address.
    pub host: String,

    /// Relay port.
    ///
    /// Default: 25
    #[serde(default = "default_port")]
    pub port: u16,

    /// Envelope sender and From header address.
    pub sender: String,

    /// Display name used in the From header.
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Identity announced in EHLO.
    #[serde(default = "default_helo_hostname")]
    pub helo_hostname: String,

    /// Per-operation timeouts.
    #[serde(default)]
    pub timeouts: SmtpTimeouts,
}

const fn default_port() -> u16 {
    25
}

fn default_sender_name() -> String {
    "Verification".to_string()
}

fn default_helo_hostname() -> String {
    "veribox.localdomain".to_string()
}

/// SMTP transport that submits messages to the configured relay.
#[derive(Debug)]
pub struct SmtpMailer {
    config: SmtpRelayConfig,
}

impl SmtpMailer {
    #[must_use]
    pub const fn new(config: SmtpRelayConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, job: &SendJob) -> Result<String, TransportError> {
        MessageBuilder::new()
            .from(format!("{} <{}>", self.config.sender_name, self.config.sender))
            .to(job.recipient.to_string())
            .subject(templates::SUBJECT)
            .text(templates::text_body(&job.username, &job.code))
            .html(templates::html_body(&job.username, &job.code))
            .build()
            .map_err(|e| TransportError::Protocol(format!("message build failed: {e}")))
    }
}

/// Run `operation` under `timeout`, mapping both failure layers onto
/// [`TransportError`].
async fn step<T>(
    timeout: Duration,
    what: &str,
    operation: impl Future<Output = veribox_smtp::client::Result<T>>,
) -> Result<T, TransportError> {
    match tokio::time::timeout(timeout, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(error.into()),
        Err(_) => Err(TransportError::Timeout(format!(
            "{what} timed out after {timeout:?}"
        ))),
    }
}

/// Fail with the server's own words unless the reply matches `accepted`.
fn expect(response: Response, accepted: impl Fn(&Response) -> bool) -> Result<Response, TransportError> {
    if accepted(&response) {
        Ok(response)
    } else {
        Err(TransportError::Smtp {
            code: response.code,
            message: response.message(),
        })
    }
}

#[async_trait]
impl Transport for SmtpMailer {
    async fn send(&self, job: &SendJob) -> Result<SendReceipt, TransportError> {
        let message = self.build_message(job)?;

        let connect = Duration::from_secs(self.config.timeouts.connect_secs);
        let command = Duration::from_secs(self.config.timeouts.command_secs);
        let data = Duration::from_secs(self.config.timeouts.data_secs);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        debug!(relay = %addr, recipient = %job.recipient, "starting SMTP transaction");

        let mut client = match tokio::time::timeout(connect, SmtpClient::connect(&addr)).await {
            Ok(Ok(client)) => client,
            Ok(Err(error)) => {
                return Err(TransportError::Connect(format!(
                    "failed to connect to {addr}: {error}"
                )));
            }
            Err(_) => {
                return Err(TransportError::Timeout(format!(
                    "connect to {addr} timed out after {connect:?}"
                )));
            }
        };

        expect(
            step(command, "greeting", client.read_greeting()).await?,
            Response::is_success,
        )?;

        expect(
            step(command, "EHLO", client.ehlo(&self.config.helo_hostname)).await?,
            Response::is_success,
        )?;

        expect(
            step(command, "MAIL FROM", client.mail_from(&self.config.sender)).await?,
            Response::is_success,
        )?;

        expect(
            step(command, "RCPT TO", client.rcpt_to(&job.recipient.to_string())).await?,
            Response::is_success,
        )?;

        expect(step(command, "DATA", client.data()).await?, |reply| {
            reply.code == 354
        })?;

        let accepted = expect(
            step(data, "message transmission", client.send_data(&message)).await?,
            Response::is_success,
        )?;

        // The message is delivered at this point; a QUIT failure is noise.
        if let Err(error) = step(command, "QUIT", client.quit()).await {
            warn!(relay = %addr, error = %error, "QUIT failed after successful delivery");
        }

        debug!(relay = %addr, recipient = %job.recipient, "message accepted");
        Ok(SendReceipt {
            response: format!("{} {}", accepted.code, accepted.message()),
        })
    }
}
