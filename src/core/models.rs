//! Request, response and result types shared by the engine and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal reason attached to every validated address.
///
/// Each reason fixes the `valid`/`deliverable` pair of the result, so a
/// [`ValidationResult`] can never claim deliverability for an invalid address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    #[serde(rename = "Invalid Format")]
    InvalidFormat,
    #[serde(rename = "Disposable Email Domain")]
    DisposableDomain,
    #[serde(rename = "Spam Trap Domain")]
    SpamTrapDomain,
    #[serde(rename = "Valid Domain (Major Provider)")]
    KnownValidMajor,
    #[serde(rename = "Valid Domain")]
    KnownValidOther,
    #[serde(rename = "Invalid Domain (No MX Record)")]
    NoMxRecord,
    #[serde(rename = "Role-based / non-personal")]
    RoleBasedAccepted,
    #[serde(rename = "Mailbox Verified")]
    MailboxVerified,
    #[serde(rename = "Domain Valid (Catch-all)")]
    CatchAllDomain,
    #[serde(rename = "Mailbox Not Found")]
    MailboxNotFound,
    #[serde(rename = "SMTP unreachable – possibly valid")]
    SmtpUnreachable,
    #[serde(rename = "Domain Valid (SMTP Blocked)")]
    SmtpBlockedAssumedValid,
    #[serde(rename = "Validation Error")]
    ValidationError,
}

impl Reason {
    /// Human-readable label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::InvalidFormat => "Invalid Format",
            Reason::DisposableDomain => "Disposable Email Domain",
            Reason::SpamTrapDomain => "Spam Trap Domain",
            Reason::KnownValidMajor => "Valid Domain (Major Provider)",
            Reason::KnownValidOther => "Valid Domain",
            Reason::NoMxRecord => "Invalid Domain (No MX Record)",
            Reason::RoleBasedAccepted => "Role-based / non-personal",
            Reason::MailboxVerified => "Mailbox Verified",
            Reason::CatchAllDomain => "Domain Valid (Catch-all)",
            Reason::MailboxNotFound => "Mailbox Not Found",
            Reason::SmtpUnreachable => "SMTP unreachable – possibly valid",
            Reason::SmtpBlockedAssumedValid => "Domain Valid (SMTP Blocked)",
            Reason::ValidationError => "Validation Error",
        }
    }

    /// `(valid, deliverable)` implied by this reason.
    ///
    /// `SmtpUnreachable` and `SmtpBlockedAssumedValid` differ only in
    /// deliverability. Both are kept as separate entries on purpose; see DESIGN.md.
    pub fn verdict(&self) -> (bool, bool) {
        match self {
            Reason::InvalidFormat
            | Reason::DisposableDomain
            | Reason::SpamTrapDomain
            | Reason::NoMxRecord
            | Reason::MailboxNotFound
            | Reason::ValidationError => (false, false),
            Reason::SmtpUnreachable => (true, false),
            Reason::KnownValidMajor
            | Reason::KnownValidOther
            | Reason::RoleBasedAccepted
            | Reason::MailboxVerified
            | Reason::CatchAllDomain
            | Reason::SmtpBlockedAssumedValid => (true, true),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub email: String,
    pub valid: bool,
    pub deliverable: bool,
    pub reason: Reason,
}

impl ValidationResult {
    /// Builds the result for `email` with the flags implied by `reason`.
    pub fn new(email: impl Into<String>, reason: Reason) -> Self {
        let (valid, deliverable) = reason.verdict();
        Self {
            email: email.into(),
            valid,
            deliverable,
            reason,
        }
    }

    /// Safe default used when validating an address failed unexpectedly.
    pub fn validation_error(email: impl Into<String>) -> Self {
        Self::new(email, Reason::ValidationError)
    }
}

/// Batch request body: `{"emails": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    pub emails: Vec<String>,
}

impl BatchRequest {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }
}

/// Batch response body: `{"results": [...]}`, one entry per input address in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<ValidationResult>,
}

/// Opaque identity of an already-authenticated caller.
///
/// The engine does not authenticate anyone; it only requires that a caller
/// identity was established before a batch is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_reasons_are_never_deliverable() {
        let all = [
            Reason::InvalidFormat,
            Reason::DisposableDomain,
            Reason::SpamTrapDomain,
            Reason::KnownValidMajor,
            Reason::KnownValidOther,
            Reason::NoMxRecord,
            Reason::RoleBasedAccepted,
            Reason::MailboxVerified,
            Reason::CatchAllDomain,
            Reason::MailboxNotFound,
            Reason::SmtpUnreachable,
            Reason::SmtpBlockedAssumedValid,
            Reason::ValidationError,
        ];
        for reason in all {
            let (valid, deliverable) = reason.verdict();
            assert!(valid || !deliverable, "{reason} breaks valid=false => deliverable=false");
        }
    }

    #[test]
    fn result_serializes_with_reason_label() {
        let result = ValidationResult::new("x@10minutemail.com", Reason::DisposableDomain);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["email"], "x@10minutemail.com");
        assert_eq!(json["valid"], false);
        assert_eq!(json["deliverable"], false);
        assert_eq!(json["reason"], "Disposable Email Domain");
    }

    #[test]
    fn unreachable_and_blocked_differ_only_in_deliverability() {
        assert_eq!(Reason::SmtpUnreachable.verdict(), (true, false));
        assert_eq!(Reason::SmtpBlockedAssumedValid.verdict(), (true, true));
    }

    #[test]
    fn request_parses_from_json() {
        let req: BatchRequest =
            serde_json::from_str(r#"{"emails": ["a@b.com", "not-an-email"]}"#).unwrap();
        assert_eq!(req.emails.len(), 2);
    }
}
