//! The SMTP probe dialogue.
//!
//! One probe is a linear suspend/resume sequence against a single host:
//! connect, read the banner, best-effort HELO, MAIL FROM, RCPT TO. The
//! socket is dropped on every exit path; only the accepted case bothers
//! with a graceful QUIT first.
//!
//! Failure handling is deliberately asymmetric. Connectivity problems are
//! host-specific noise (firewalls, grey-listing, flaky routes) and must not
//! stop us trying the remaining exchangers, but a 5xx on RCPT is a
//! statement about the mailbox itself and ends the whole verification.

use std::time::Duration;

use tracing::debug;
use veribox_common::address::EmailAddress;
use veribox_smtp::client::SmtpClient;

use serde::{Deserialize, Serialize};

use crate::{
    dns::{DnsConfig, DnsError, MxRecord, MxResolver},
    outcome::VerificationOutcome,
};

const REASON_INVALID_FORMAT: &str = "invalid format";
const REASON_NO_MX: &str = "no MX records";
const REASON_EXHAUSTED: &str = "all MX servers failed to verify mailbox";

/// Configuration for the mailbox prober.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Identity announced in HELO.
    #[serde(default = "default_helo_hostname")]
    pub helo_hostname: String,

    /// Envelope sender used for MAIL FROM.
    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    /// Socket timeout applied to every probe operation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Port probed on each exchange host.
    #[serde(default = "default_port")]
    pub port: u16,

    /// DNS resolver settings.
    #[serde(default)]
    pub dns: DnsConfig,
}

fn default_helo_hostname() -> String {
    "veribox.localdomain".to_string()
}

fn default_mail_from() -> String {
    "verify@veribox.localdomain".to_string()
}

const fn default_timeout_secs() -> u64 {
    8
}

const fn default_port() -> u16 {
    25
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            helo_hostname: default_helo_hostname(),
            mail_from: default_mail_from(),
            timeout_secs: default_timeout_secs(),
            port: default_port(),
            dns: DnsConfig::default(),
        }
    }
}

/// What a single host told us, before outcome classification.
enum HostProbe {
    /// RCPT accepted.
    Accepted(String),
    /// RCPT refused with a 5xx — authoritative.
    Refused(String),
    /// Anything else: unreachable, timed out, MAIL FROM refused, 4xx.
    Inconclusive(String),
}

/// Resolves a domain's exchangers and probes them in priority order.
#[derive(Debug)]
pub struct MailboxVerifier {
    resolver: MxResolver,
    config: ProbeConfig,
}

impl MailboxVerifier {
    /// Create a verifier using the system DNS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be constructed.
    pub fn new(config: ProbeConfig) -> Result<Self, DnsError> {
        let resolver = MxResolver::new(&config.dns)?;

        Ok(Self { resolver, config })
    }

    /// Resolve the sorted MX record list for `domain`.
    ///
    /// # Errors
    ///
    /// Returns an error when resolution fails or no records exist.
    pub async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        self.resolver.resolve_mx(domain).await
    }

    /// Verify `address` end to end: syntax, MX resolution, probe.
    pub async fn verify(&self, address: &str) -> VerificationOutcome {
        let Ok(address) = EmailAddress::parse(address) else {
            return VerificationOutcome::Unresolved {
                reason: REASON_INVALID_FORMAT.to_string(),
            };
        };

        let records = match self.resolver.resolve_mx(address.domain()).await {
            Ok(records) => records,
            Err(err) => {
                debug!(domain = address.domain(), error = %err, "MX resolution failed");
                return VerificationOutcome::Unresolved {
                    reason: REASON_NO_MX.to_string(),
                };
            }
        };

        self.verify_records(&address, &records).await
    }

    /// Probe `records` in order for `address`.
    ///
    /// The records are assumed to be sorted already, as produced by
    /// [`MailboxVerifier::lookup_mx`].
    pub async fn verify_records(
        &self,
        address: &EmailAddress,
        records: &[MxRecord],
    ) -> VerificationOutcome {
        for record in records {
            match self.probe_host(&record.exchange, address).await {
                HostProbe::Accepted(info) => {
                    return VerificationOutcome::Verified {
                        mx: record.exchange.clone(),
                        info,
                    };
                }
                HostProbe::Refused(reason) => {
                    // Authoritative; remaining hosts would only repeat it.
                    return VerificationOutcome::Rejected {
                        mx: record.exchange.clone(),
                        reason,
                    };
                }
                HostProbe::Inconclusive(reason) => {
                    debug!(
                        mx = %record.exchange,
                        address = %address,
                        reason,
                        "host inconclusive, trying next exchanger"
                    );
                }
            }
        }

        VerificationOutcome::Unresolved {
            reason: REASON_EXHAUSTED.to_string(),
        }
    }

    /// Run the probe dialogue against one exchange host.
    async fn probe_host(&self, exchange: &str, address: &EmailAddress) -> HostProbe {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let target = format!("{exchange}:{}", self.config.port);

        let mut client = match tokio::time::timeout(timeout, SmtpClient::connect(&target)).await {
            Ok(Ok(client)) => client,
            Ok(Err(err)) => {
                return HostProbe::Inconclusive(format!("connect to {target} failed: {err}"));
            }
            Err(_) => {
                return HostProbe::Inconclusive(format!("connect to {target} timed out"));
            }
        };

        match tokio::time::timeout(timeout, client.read_greeting()).await {
            Ok(Ok(banner)) if banner.is_success() => {}
            Ok(Ok(banner)) => {
                return HostProbe::Inconclusive(format!(
                    "server refused session: {} {}",
                    banner.code,
                    banner.message()
                ));
            }
            Ok(Err(err)) => return HostProbe::Inconclusive(format!("banner read failed: {err}")),
            Err(_) => return HostProbe::Inconclusive("banner timed out".to_string()),
        }

        // Best effort only. Some servers omit or mangle this step, and a
        // refused HELO still leaves RCPT answerable.
        if let Ok(Ok(reply)) =
            tokio::time::timeout(timeout, client.helo(&self.config.helo_hostname)).await
        {
            debug!(mx = exchange, code = reply.code, "HELO reply");
        }

        match tokio::time::timeout(timeout, client.mail_from(&self.config.mail_from)).await {
            Ok(Ok(reply)) if reply.is_success() => {}
            Ok(Ok(reply)) => {
                return HostProbe::Inconclusive(format!(
                    "MAIL FROM refused: {} {}",
                    reply.code,
                    reply.message()
                ));
            }
            Ok(Err(err)) => return HostProbe::Inconclusive(format!("MAIL FROM failed: {err}")),
            Err(_) => return HostProbe::Inconclusive("MAIL FROM timed out".to_string()),
        }

        let reply = match tokio::time::timeout(
            timeout,
            client.rcpt_to(&address.to_string()),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => return HostProbe::Inconclusive(format!("RCPT TO failed: {err}")),
            Err(_) => return HostProbe::Inconclusive("RCPT TO timed out".to_string()),
        };

        if reply.is_success() {
            // Graceful close where possible; the verdict stands either way.
            let _ = tokio::time::timeout(timeout, client.quit()).await;
            return HostProbe::Accepted(format!("{} {}", reply.code, reply.message()));
        }

        if reply.is_permanent_error() {
            return HostProbe::Refused(format!("{} {}", reply.code, reply.message()));
        }

        HostProbe::Inconclusive(format!(
            "inconclusive RCPT reply: {} {}",
            reply.code,
            reply.message()
        ))
    }
}
