//! Parsed email address type.
//!
//! Validation here is deliberately shallow: a non-empty local part, a single
//! `@`, and a domain containing at least one dot. Anything stricter belongs
//! to the receiving server, which is the only authority on what it accepts.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing an [`EmailAddress`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must contain exactly one '@'")]
    MissingAtSign,

    #[error("address has an empty local part")]
    EmptyLocalPart,

    #[error("address domain must contain a dot: {0}")]
    InvalidDomain(String),
}

/// An email address split into its local part and domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress {
    local_part: String,
    domain: String,
}

impl EmailAddress {
    /// Parse an address, enforcing the `local@domain.tld` shape.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] when the input does not contain exactly
    /// one `@`, has an empty local part, or has a domain without a dot.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let input = input.trim();

        let mut parts = input.splitn(2, '@');
        let local_part = parts.next().unwrap_or_default();
        let Some(domain) = parts.next() else {
            return Err(AddressError::MissingAtSign);
        };

        if local_part.is_empty() {
            return Err(AddressError::EmptyLocalPart);
        }

        if domain.contains('@') {
            return Err(AddressError::MissingAtSign);
        }

        // Dots at the edges make for hostnames no resolver will accept.
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(AddressError::InvalidDomain(domain.to_string()));
        }

        Ok(Self {
            local_part: local_part.to_string(),
            domain: domain.to_string(),
        })
    }

    #[must_use]
    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

impl FromStr for EmailAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.to_string()
    }
}
