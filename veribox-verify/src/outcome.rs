//! Verification results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The result of one mailbox verification call.
///
/// A `Rejected` outcome is authoritative: some exchanger explicitly refused
/// the recipient, which is a fact about the address no other host can
/// overturn. `Unresolved` means no host produced a definitive answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationOutcome {
    /// An exchanger accepted the recipient.
    Verified {
        /// The exchange host that answered.
        mx: String,
        /// The server's RCPT reply.
        info: String,
    },
    /// An exchanger permanently refused the recipient.
    Rejected {
        /// The exchange host that answered.
        mx: String,
        /// The server's RCPT reply.
        reason: String,
    },
    /// No definitive answer could be obtained.
    Unresolved {
        /// Human-readable reason.
        reason: String,
    },
}

impl VerificationOutcome {
    /// `true` when some host produced an authoritative answer either way.
    #[must_use]
    pub const fn is_definitive(&self) -> bool {
        matches!(self, Self::Verified { .. } | Self::Rejected { .. })
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified { mx, .. } => write!(f, "Verified by {mx}"),
            Self::Rejected { mx, reason } => write!(f, "Rejected by {mx} ({reason})"),
            Self::Unresolved { reason } => write!(f, "Unresolved ({reason})"),
        }
    }
}
