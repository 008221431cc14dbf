//! MX record resolution.
//!
//! Lookups are performed per verification call and never cached: record
//! lists are ephemeral, and the sliding volumes involved here are far below
//! anything a resolver cache would matter for.

use std::time::Duration;

use hickory_resolver::{
    TokioResolver,
    config::ResolverOpts,
    name_server::TokioConnectionProvider,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during MX resolution.
#[derive(Debug, Error)]
pub enum DnsError {
    /// The domain has no MX records.
    #[error("No MX records found for domain: {0}")]
    NoRecords(String),

    /// The DNS query failed due to network or resolver issues.
    #[error("DNS lookup failed: {0}")]
    LookupFailed(#[from] hickory_resolver::ResolveError),
}

/// Configuration for the DNS resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    /// DNS query timeout in seconds (default: 5)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    5
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// A mail exchanger for a domain.
///
/// Lower priority values are preferred. Lists handed out by
/// [`MxResolver::resolve_mx`] are sorted ascending by priority, with ties
/// left in DNS response order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    /// The exchange hostname, with any trailing root dot removed.
    pub exchange: String,
    /// MX preference value (lower = preferred).
    pub priority: u16,
}

impl MxRecord {
    #[must_use]
    pub const fn new(exchange: String, priority: u16) -> Self {
        Self { exchange, priority }
    }
}

/// DNS resolver for MX lookups.
#[derive(Debug)]
pub struct MxResolver {
    resolver: TokioResolver,
}

impl MxResolver {
    /// Create a resolver from the system DNS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the system DNS configuration cannot be loaded.
    pub fn new(config: &DnsConfig) -> Result<Self, DnsError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(config.timeout_secs);

        let resolver = TokioResolver::builder(TokioConnectionProvider::default())?
            .with_options(opts)
            .build();

        Ok(Self { resolver })
    }

    /// Resolve the MX records of `domain`, sorted ascending by priority.
    ///
    /// Ties keep the order the DNS response listed them in (the sort is
    /// stable).
    ///
    /// # Errors
    ///
    /// Returns [`DnsError::NoRecords`] when the domain has no MX records,
    /// or [`DnsError::LookupFailed`] when the query itself fails.
    pub async fn resolve_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        debug!(domain, "resolving MX records");

        let lookup = match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => lookup,
            Err(err) if err.is_no_records_found() => {
                debug!(domain, "no MX records");
                return Err(DnsError::NoRecords(domain.to_string()));
            }
            Err(err) => {
                warn!(domain, error = %err, "MX lookup failed");
                return Err(DnsError::LookupFailed(err));
            }
        };

        let mut records: Vec<MxRecord> = lookup
            .iter()
            .map(|mx| {
                let exchange = mx.exchange().to_utf8();
                let exchange = exchange.strip_suffix('.').unwrap_or(&exchange).to_string();
                MxRecord::new(exchange, mx.preference())
            })
            .collect();

        if records.is_empty() {
            return Err(DnsError::NoRecords(domain.to_string()));
        }

        records.sort_by_key(|record| record.priority);

        debug!(domain, count = records.len(), "resolved MX records");
        Ok(records)
    }
}
