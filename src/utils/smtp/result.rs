// src/utils/smtp/result.rs
//! Defines the outcome type for SMTP mailbox probes.

use std::fmt;

/// Classification of a probe, before it is mapped to a validation reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Target accepted and a fabricated address at the same domain rejected.
    Verified,
    /// Target and fabricated address both accepted.
    CatchAll,
    /// Target rejected by the server.
    NotVerified,
    /// Connection or protocol failure, or the probe timed out.
    SmtpUnreachable,
    /// The server answered, but not in a way that settles the question.
    ServerError,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeStatus::Verified => "verified",
            ProbeStatus::CatchAll => "catch_all",
            ProbeStatus::NotVerified => "not_verified",
            ProbeStatus::SmtpUnreachable => "smtp_unreachable",
            ProbeStatus::ServerError => "server_error",
        })
    }
}

/// Represents the outcome of an SMTP probe for an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: ProbeStatus,
    /// Detailed message about the outcome.
    pub message: String,
}

impl ProbeOutcome {
    pub fn new(status: ProbeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn verified(message: impl Into<String>) -> Self {
        Self::new(ProbeStatus::Verified, message)
    }

    /// Acceptance of a fabricated local part is a heuristic signal: a random
    /// token could in principle collide with a real mailbox.
    pub fn catch_all(message: impl Into<String>) -> Self {
        Self::new(ProbeStatus::CatchAll, message)
    }

    pub fn not_verified(message: impl Into<String>) -> Self {
        Self::new(ProbeStatus::NotVerified, message)
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(ProbeStatus::SmtpUnreachable, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ProbeStatus::ServerError, message)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}
