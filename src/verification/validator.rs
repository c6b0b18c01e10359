//! Per-address decision pipeline.
//!
//! Stages run in a fixed order and each can end the validation: syntax,
//! disposable, spam trap, known-valid, DNS, role-based shortcut, SMTP probe.
//! Everything before the DNS stage is in-memory.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::models::{Reason, ValidationResult};
use crate::utils::dns::DnsCache;
use crate::utils::smtp::{MailboxProber, ProbeOutcome, ProbeStatus, SmtpProber};
use crate::verification::classifier::{DomainClass, DomainClassifier};
use crate::verification::syntax::parse_address;
use regex::Regex;
use std::sync::Arc;

pub struct EmailValidator {
    email_regex: Regex,
    classifier: DomainClassifier,
    dns: Arc<DnsCache>,
    prober: Arc<dyn MailboxProber>,
}

impl EmailValidator {
    pub fn new(
        email_regex: Regex,
        classifier: DomainClassifier,
        dns: Arc<DnsCache>,
        prober: Arc<dyn MailboxProber>,
    ) -> Self {
        Self {
            email_regex,
            classifier,
            dns,
            prober,
        }
    }

    /// Production wiring: trust-dns backed cache and the SMTP prober.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dns = Arc::new(DnsCache::from_config(config)?);
        let prober = Arc::new(SmtpProber::from_config(config)?);
        Ok(Self::new(
            config.email_regex.clone(),
            DomainClassifier::new(config.classification.clone()),
            dns,
            prober,
        ))
    }

    pub fn dns_cache(&self) -> &Arc<DnsCache> {
        &self.dns
    }

    /// Validates one address. Surrounding whitespace is ignored and the
    /// trimmed form is echoed back in the result.
    pub async fn validate(&self, email: &str) -> ValidationResult {
        let email = email.trim();

        let Some(parsed) = parse_address(&self.email_regex, email) else {
            return ValidationResult::new(email, Reason::InvalidFormat);
        };
        let domain = parsed.domain.as_str();

        let class = self.classifier.classify(domain, &parsed.local_part);
        match class {
            DomainClass::Disposable => return ValidationResult::new(email, Reason::DisposableDomain),
            DomainClass::SpamTrap => return ValidationResult::new(email, Reason::SpamTrapDomain),
            DomainClass::KnownValidMajor => {
                return ValidationResult::new(email, Reason::KnownValidMajor)
            }
            DomainClass::KnownValidOther => {
                return ValidationResult::new(email, Reason::KnownValidOther)
            }
            DomainClass::RoleBased | DomainClass::Unclassified => {}
        }

        let Some(exchanger) = self.dns.resolve_mail_exchanger(domain).await else {
            tracing::debug!(target: "validation", "{}: no mail exchanger for {}", email, domain);
            return ValidationResult::new(email, Reason::NoMxRecord);
        };

        if class == DomainClass::RoleBased {
            return ValidationResult::new(email, Reason::RoleBasedAccepted);
        }

        let outcome = self.prober.probe(&exchanger, email, domain).await;
        tracing::debug!(target: "validation", "{}: probe of {} -> {}", email, exchanger, outcome);
        ValidationResult::new(email, reason_for_probe(&outcome))
    }
}

/// Maps a probe outcome to its terminal reason.
///
/// `ServerError` is fail-open (valid and deliverable) because many servers
/// block probing outright; `SmtpUnreachable` keeps the address valid but not
/// deliverable.
pub fn reason_for_probe(outcome: &ProbeOutcome) -> Reason {
    match outcome.status {
        ProbeStatus::Verified => Reason::MailboxVerified,
        ProbeStatus::CatchAll => Reason::CatchAllDomain,
        ProbeStatus::NotVerified => Reason::MailboxNotFound,
        ProbeStatus::SmtpUnreachable => Reason::SmtpUnreachable,
        ProbeStatus::ServerError => Reason::SmtpBlockedAssumedValid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result as AppResult;
    use crate::utils::dns::MxResolver;
    use crate::verification::classifier::{normalize_entries, ClassificationSets};
    use crate::verification::syntax::DEFAULT_EMAIL_REGEX;
    use futures::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct MapResolver {
        answers: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl MxResolver for MapResolver {
        fn lookup_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, AppResult<Option<String>>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(self.answers.get(domain).cloned())
            })
        }
    }

    struct ScriptedProber {
        status: ProbeStatus,
        calls: AtomicUsize,
    }

    impl MailboxProber for ScriptedProber {
        fn probe<'a>(
            &'a self,
            _exchanger: &'a str,
            _address: &'a str,
            _domain: &'a str,
        ) -> BoxFuture<'a, ProbeOutcome> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                ProbeOutcome::new(self.status, "scripted")
            })
        }
    }

    struct Harness {
        validator: EmailValidator,
        resolver: Arc<MapResolver>,
        prober: Arc<ScriptedProber>,
    }

    impl Harness {
        fn new(status: ProbeStatus) -> Self {
            let mut answers = HashMap::new();
            answers.insert("companywithmx.test".to_string(), "mx.companywithmx.test".to_string());
            let resolver = Arc::new(MapResolver {
                answers,
                ..Default::default()
            });
            let prober = Arc::new(ScriptedProber {
                status,
                calls: AtomicUsize::new(0),
            });
            let sets = ClassificationSets {
                known_valid_major: normalize_entries(["bigmail.test"]),
                known_valid_other: normalize_entries(["partner.test"]),
                disposable: normalize_entries(["burner.test"]),
                spam_trap: normalize_entries(["trap.test"]),
                role_prefixes: normalize_entries(["admin", "support"]),
            };
            let dns = Arc::new(DnsCache::new(
                resolver.clone(),
                Duration::from_secs(3600),
                Duration::from_secs(1),
                4,
            ));
            let validator = EmailValidator::new(
                DEFAULT_EMAIL_REGEX.clone(),
                DomainClassifier::new(sets),
                dns,
                prober.clone(),
            );
            Self {
                validator,
                resolver,
                prober,
            }
        }

        fn network_calls(&self) -> usize {
            self.resolver.calls.load(Ordering::SeqCst) + self.prober.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn invalid_format_is_terminal() {
        let h = Harness::new(ProbeStatus::Verified);
        let result = h.validator.validate("not-an-email").await;
        assert_eq!(result, ValidationResult::new("not-an-email", Reason::InvalidFormat));
        assert_eq!(h.network_calls(), 0);
    }

    #[tokio::test]
    async fn rejecting_sets_ignore_local_part() {
        let h = Harness::new(ProbeStatus::Verified);
        for local in ["x", "admin", "jane.doe"] {
            let r = h.validator.validate(&format!("{local}@burner.test")).await;
            assert_eq!(r.reason, Reason::DisposableDomain);
            assert!(!r.valid && !r.deliverable);
            let r = h.validator.validate(&format!("{local}@TRAP.test")).await;
            assert_eq!(r.reason, Reason::SpamTrapDomain);
            assert!(!r.valid && !r.deliverable);
        }
        assert_eq!(h.network_calls(), 0);
    }

    #[tokio::test]
    async fn known_valid_domains_skip_the_network() {
        let h = Harness::new(ProbeStatus::NotVerified);
        let major = h.validator.validate("someone@bigmail.test").await;
        let other = h.validator.validate("someone@partner.test").await;
        assert_eq!(major.reason, Reason::KnownValidMajor);
        assert_eq!(other.reason, Reason::KnownValidOther);
        assert!(major.valid && major.deliverable && other.valid && other.deliverable);
        assert_eq!(h.network_calls(), 0);
    }

    #[tokio::test]
    async fn missing_exchanger_is_invalid() {
        let h = Harness::new(ProbeStatus::Verified);
        let r = h.validator.validate("user@zzz-no-mx.test").await;
        assert_eq!(r.reason, Reason::NoMxRecord);
        assert!(!r.valid && !r.deliverable);
        assert_eq!(h.prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn role_prefix_with_exchanger_skips_probe() {
        let h = Harness::new(ProbeStatus::NotVerified);
        let r = h.validator.validate("Admin@companywithmx.test").await;
        assert_eq!(r.reason, Reason::RoleBasedAccepted);
        assert!(r.valid && r.deliverable);
        assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn role_prefix_without_exchanger_is_still_rejected() {
        let h = Harness::new(ProbeStatus::Verified);
        let r = h.validator.validate("admin@nowhere.test").await;
        assert_eq!(r.reason, Reason::NoMxRecord);
    }

    #[tokio::test]
    async fn probe_statuses_map_to_reasons() {
        let cases = [
            (ProbeStatus::Verified, Reason::MailboxVerified, true, true),
            (ProbeStatus::CatchAll, Reason::CatchAllDomain, true, true),
            (ProbeStatus::NotVerified, Reason::MailboxNotFound, false, false),
            (ProbeStatus::SmtpUnreachable, Reason::SmtpUnreachable, true, false),
            (ProbeStatus::ServerError, Reason::SmtpBlockedAssumedValid, true, true),
        ];
        for (status, reason, valid, deliverable) in cases {
            let h = Harness::new(status);
            let r = h.validator.validate("jane@companywithmx.test").await;
            assert_eq!(r.reason, reason);
            assert_eq!((r.valid, r.deliverable), (valid, deliverable), "{status}");
            assert_eq!(h.prober.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_trimmed() {
        let h = Harness::new(ProbeStatus::Verified);
        let r = h.validator.validate("  someone@bigmail.test \n").await;
        assert_eq!(r.email, "someone@bigmail.test");
        assert_eq!(r.reason, Reason::KnownValidMajor);
    }

    #[tokio::test]
    async fn repeated_domains_share_one_lookup() {
        let h = Harness::new(ProbeStatus::Verified);
        h.validator.validate("a@companywithmx.test").await;
        h.validator.validate("b@companywithmx.test").await;
        h.validator.validate("c@nomx.test").await;
        h.validator.validate("d@nomx.test").await;
        assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.validator.dns_cache().len(), 2);
    }
}
