//! TTL-bounded mail-exchanger cache shared by all validations.
//!
//! The lock guards only the read-check and the store; it is never held across
//! a DNS query. Two concurrent misses for the same domain therefore both hit
//! the network and the later store wins.

use super::{MxResolver, TrustDnsMxResolver};
use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    /// `None` records a confirmed absence of a usable exchanger.
    exchanger: Option<String>,
    recorded_at: Instant,
}

pub struct DnsCache {
    resolver: Arc<dyn MxResolver>,
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    lookup_timeout: Duration,
    workers: Semaphore,
}

impl DnsCache {
    /// `workers` bounds how many DNS queries run at once, independent of callers.
    pub fn new(
        resolver: Arc<dyn MxResolver>,
        ttl: Duration,
        lookup_timeout: Duration,
        workers: usize,
    ) -> Self {
        Self {
            resolver,
            entries: Mutex::new(HashMap::new()),
            ttl,
            lookup_timeout,
            workers: Semaphore::new(workers.max(1)),
        }
    }

    /// Cache over the trust-dns resolver configured by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = TrustDnsMxResolver::from_config(config)?;
        Ok(Self::new(
            Arc::new(resolver),
            config.dns_cache_ttl,
            config.dns_timeout,
            config.dns_workers,
        ))
    }

    /// Returns the preferred mail exchanger of `domain`, or `None` when it has none.
    ///
    /// Never fails: timeouts and resolver errors count as "no exchanger" and
    /// are cached for the full TTL like positive answers.
    pub async fn resolve_mail_exchanger(&self, domain: &str) -> Option<String> {
        let key = domain.trim().to_lowercase();

        if let Some(cached) = self.live_entry(&key) {
            tracing::debug!(target: "dns_cache", "Cache hit for {}: {:?}", key, cached);
            return cached;
        }

        let start_time = Instant::now();
        let exchanger = self.query(&key).await;
        tracing::debug!(
            target: "dns_cache",
            "Resolved {} in {:.2?}: {:?}",
            key,
            start_time.elapsed(),
            exchanger
        );

        self.store(key, exchanger.clone());
        exchanger
    }

    /// Records an answer and drops every entry whose TTL has run out.
    fn store(&self, key: String, exchanger: Option<String>) {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| e.recorded_at.elapsed() < self.ttl);
        let pruned = before - entries.len();
        if pruned > 0 {
            tracing::debug!(target: "dns_cache", "Pruned {} expired entr(ies)", pruned);
        }
        entries.insert(
            key,
            CacheEntry {
                exchanger,
                recorded_at: Instant::now(),
            },
        );
    }

    /// Live cached value for `key`, dropping it if it has expired.
    fn live_entry(&self, key: &str) -> Option<Option<String>> {
        let mut entries = self.entries.lock();
        let state = entries
            .get(key)
            .map(|e| (e.recorded_at.elapsed() < self.ttl, e.exchanger.clone()));
        match state {
            Some((true, exchanger)) => Some(exchanger),
            Some((false, _)) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn query(&self, domain: &str) -> Option<String> {
        let _permit = match self.workers.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!(target: "dns_cache", "DNS worker pool closed: {}", e);
                return None;
            }
        };

        match self.lookup(domain).await {
            Ok(exchanger) => exchanger,
            Err(e @ AppError::DnsTimeout(_)) => {
                tracing::warn!(target: "dns_cache", "{} after {:?}", e, self.lookup_timeout);
                None
            }
            Err(e) => {
                tracing::debug!(target: "dns_cache", "MX lookup failed for {}: {}", domain, e);
                None
            }
        }
    }

    async fn lookup(&self, domain: &str) -> Result<Option<String>> {
        tokio::time::timeout(self.lookup_timeout, self.resolver.lookup_mx(domain))
            .await
            .map_err(|_| AppError::DnsTimeout(domain.to_string()))?
    }

    /// Number of entries currently stored. Expired entries linger until the next store.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        tracing::info!(target: "dns_cache", "DNS cache cleared");
    }
}
