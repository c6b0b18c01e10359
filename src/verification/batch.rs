//! Bounded-concurrency validation of an address list.

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::{BatchRequest, BatchResponse, Principal, ValidationResult};
use crate::verification::validator::EmailValidator;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Called once for every address as soon as its result is known.
pub type ProgressHook = Arc<dyn Fn(&ValidationResult) + Send + Sync>;

pub struct BatchCoordinator {
    validator: Arc<EmailValidator>,
    max_in_flight: usize,
    max_batch_size: usize,
    progress: Option<ProgressHook>,
}

impl BatchCoordinator {
    pub fn new(validator: Arc<EmailValidator>, max_in_flight: usize, max_batch_size: usize) -> Self {
        Self {
            validator,
            max_in_flight: max_in_flight.max(1),
            max_batch_size,
            progress: None,
        }
    }

    pub fn from_config(validator: Arc<EmailValidator>, config: &Config) -> Self {
        Self::new(validator, config.max_concurrency, config.max_batch_size)
    }

    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    /// Rejects empty and oversized requests before any work starts.
    pub fn check_request(&self, request: &BatchRequest) -> Result<()> {
        let count = request.emails.len();
        if count == 0 {
            return Err(AppError::EmptyBatch);
        }
        if count > self.max_batch_size {
            return Err(AppError::BatchTooLarge {
                count,
                max: self.max_batch_size,
            });
        }
        Ok(())
    }

    /// Validates every address of `request` on behalf of `caller`.
    ///
    /// At most `max_in_flight` validations run at once. Results come back in
    /// input order; an address whose validation task fails gets a
    /// `Validation Error` result without affecting the others.
    pub async fn validate_batch(
        &self,
        caller: &Principal,
        request: BatchRequest,
    ) -> Result<BatchResponse> {
        self.check_request(&request)?;

        let total = request.emails.len();
        tracing::info!(
            target: "batch",
            "Validating {} address(es) for caller {} (max {} in flight)",
            total,
            caller.id(),
            self.max_in_flight
        );
        let start_time = Instant::now();
        let gate = Arc::new(Semaphore::new(self.max_in_flight));

        let handles: Vec<_> = request
            .emails
            .iter()
            .map(|email| {
                let validator = Arc::clone(&self.validator);
                let gate = Arc::clone(&gate);
                let progress = self.progress.clone();
                let email = email.clone();
                tokio::spawn(async move {
                    let _permit = gate
                        .acquire_owned()
                        .await
                        .map_err(|e| AppError::Task(e.to_string()))?;
                    let result = validator.validate(&email).await;
                    if let Some(hook) = progress {
                        hook(&result);
                    }
                    Ok::<_, AppError>(result)
                })
            })
            .collect();

        let joined = futures::future::join_all(handles).await;

        let mut failures = 0usize;
        let results: Vec<ValidationResult> = joined
            .into_iter()
            .zip(request.emails)
            .map(|(joined, email)| match joined.map_err(AppError::from).and_then(|r| r) {
                Ok(result) => result,
                Err(e) => {
                    failures += 1;
                    tracing::error!(target: "batch", "Validation of {} failed: {}", email, e);
                    let result = ValidationResult::validation_error(email.trim());
                    if let Some(hook) = &self.progress {
                        hook(&result);
                    }
                    result
                }
            })
            .collect();

        let valid = results.iter().filter(|r| r.valid).count();
        let deliverable = results.iter().filter(|r| r.deliverable).count();
        tracing::info!(
            target: "batch",
            "Batch of {} finished in {:.2?}: {} valid, {} deliverable, {} failed",
            total,
            start_time.elapsed(),
            valid,
            deliverable,
            failures
        );

        Ok(BatchResponse { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result as AppResult;
    use crate::core::models::Reason;
    use crate::utils::dns::{DnsCache, MxResolver};
    use crate::utils::smtp::{MailboxProber, ProbeOutcome};
    use crate::verification::classifier::{normalize_entries, ClassificationSets, DomainClassifier};
    use crate::verification::syntax::DEFAULT_EMAIL_REGEX;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EveryDomainHasMx {
        calls: AtomicUsize,
    }

    impl MxResolver for EveryDomainHasMx {
        fn lookup_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, AppResult<Option<String>>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if domain.starts_with("nomx") {
                    Ok(None)
                } else {
                    Ok(Some(format!("mx.{domain}")))
                }
            })
        }
    }

    /// Sleeps per probe, tracks peak concurrency, and panics on `panic@` addresses.
    #[derive(Default)]
    struct SlowProber {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl MailboxProber for SlowProber {
        fn probe<'a>(
            &'a self,
            _exchanger: &'a str,
            address: &'a str,
            _domain: &'a str,
        ) -> BoxFuture<'a, ProbeOutcome> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                if address.starts_with("panic@") {
                    panic!("prober blew up");
                }
                ProbeOutcome::verified("ok")
            })
        }
    }

    fn coordinator(max_in_flight: usize) -> (BatchCoordinator, Arc<EveryDomainHasMx>, Arc<SlowProber>) {
        let resolver = Arc::new(EveryDomainHasMx {
            calls: AtomicUsize::new(0),
        });
        let prober = Arc::new(SlowProber::default());
        let sets = ClassificationSets {
            known_valid_major: normalize_entries(["bigmail.test"]),
            disposable: normalize_entries(["burner.test"]),
            ..Default::default()
        };
        let dns = Arc::new(DnsCache::new(
            resolver.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(1),
            20,
        ));
        let validator = Arc::new(EmailValidator::new(
            DEFAULT_EMAIL_REGEX.clone(),
            DomainClassifier::new(sets),
            dns,
            prober.clone(),
        ));
        (
            BatchCoordinator::new(validator, max_in_flight, 1000),
            resolver,
            prober,
        )
    }

    fn caller() -> Principal {
        Principal::new("tester")
    }

    #[tokio::test]
    async fn empty_and_oversized_requests_are_rejected_up_front() {
        let (batch, resolver, prober) = coordinator(50);

        let err = batch
            .validate_batch(&caller(), BatchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyBatch));

        let too_many = BatchRequest::new((0..1001).map(|i| format!("u{i}@d{i}.test")));
        let err = batch.validate_batch(&caller(), too_many).await.unwrap_err();
        assert!(matches!(err, AppError::BatchTooLarge { count: 1001, max: 1000 }));

        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn thousand_addresses_are_accepted() {
        let (batch, _, _) = coordinator(50);
        let request = BatchRequest::new((0..1000).map(|i| format!("user{i}@bigmail.test")));
        let response = batch.validate_batch(&caller(), request).await.unwrap();
        assert_eq!(response.results.len(), 1000);
        assert!(response.results.iter().all(|r| r.reason == Reason::KnownValidMajor));
    }

    #[tokio::test]
    async fn in_flight_validations_never_exceed_the_gate() {
        let (batch, _, prober) = coordinator(50);
        let request = BatchRequest::new((0..300).map(|i| format!("user{i}@d{i}.test")));
        let response = batch.validate_batch(&caller(), request).await.unwrap();

        assert_eq!(response.results.len(), 300);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 300);
        let peak = prober.peak.load(Ordering::SeqCst);
        assert!(peak <= 50, "peak concurrency was {peak}");
        assert!(peak > 1, "validations did not overlap");
    }

    #[tokio::test]
    async fn results_keep_input_order() {
        let (batch, _, _) = coordinator(4);
        let emails = vec![
            "jane@slow.test".to_string(),
            "not-an-email".to_string(),
            "x@burner.test".to_string(),
            "someone@bigmail.test".to_string(),
            "user@nomx.test".to_string(),
        ];
        let response = batch
            .validate_batch(&caller(), BatchRequest::new(emails.clone()))
            .await
            .unwrap();

        let got: Vec<_> = response.results.iter().map(|r| r.email.clone()).collect();
        assert_eq!(got, emails);
        let reasons: Vec<_> = response.results.iter().map(|r| r.reason).collect();
        assert_eq!(
            reasons,
            vec![
                Reason::MailboxVerified,
                Reason::InvalidFormat,
                Reason::DisposableDomain,
                Reason::KnownValidMajor,
                Reason::NoMxRecord,
            ]
        );
    }

    #[tokio::test]
    async fn a_failing_address_does_not_affect_the_rest() {
        let (batch, _, _) = coordinator(8);
        let request = BatchRequest::new(["a@one.test", "panic@two.test", "b@three.test"]);
        let response = batch.validate_batch(&caller(), request).await.unwrap();

        assert_eq!(response.results[0].reason, Reason::MailboxVerified);
        assert_eq!(
            response.results[1],
            ValidationResult::validation_error("panic@two.test")
        );
        assert_eq!(response.results[2].reason, Reason::MailboxVerified);
    }

    #[tokio::test]
    async fn progress_hook_sees_every_address() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let (batch, _, _) = coordinator(8);
        let batch = batch.with_progress(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let request = BatchRequest::new(["a@one.test", "panic@two.test", "bad", "x@bigmail.test"]);
        batch.validate_batch(&caller(), request).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }
}
