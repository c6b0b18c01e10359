//! Mail-exchanger discovery: the resolver seam and its trust-dns implementation.

pub mod cache;

pub use cache::DnsCache;

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use futures::future::BoxFuture;
use std::net::IpAddr;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::TokioAsyncResolver;

/// Looks up the preferred mail exchanger of a domain.
///
/// `Ok(None)` means the domain has no usable exchanger. Errors are reported
/// so callers can log them; [`DnsCache`] treats both the same way.
pub trait MxResolver: Send + Sync {
    fn lookup_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Result<Option<String>>>;
}

/// [`MxResolver`] backed by an async trust-dns resolver.
pub struct TrustDnsMxResolver {
    resolver: TokioAsyncResolver,
}

impl TrustDnsMxResolver {
    /// Builds a resolver from the DNS settings in `config`.
    ///
    /// An empty `dns_servers` list falls back to the system resolver configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut opts = ResolverOpts::default();
        opts.timeout = config.dns_timeout;
        opts.attempts = 2;
        // Caching is done by DnsCache with its own TTL policy.
        opts.cache_size = 0;

        let resolver = if config.dns_servers.is_empty() {
            tracing::info!(target: "dns_cache", "Using system DNS configuration");
            let (sys_config, mut sys_opts) =
                trust_dns_resolver::system_conf::read_system_conf().map_err(|e| {
                    AppError::Initialization(format!("Failed to read system DNS config: {}", e))
                })?;
            sys_opts.timeout = opts.timeout;
            sys_opts.attempts = opts.attempts;
            sys_opts.cache_size = 0;
            TokioAsyncResolver::tokio(sys_config, sys_opts)
        } else {
            let ips = config
                .dns_servers
                .iter()
                .map(|s| s.parse::<IpAddr>())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            tracing::info!(
                target: "dns_cache",
                "Using {} configured DNS server(s), timeout {:?}",
                ips.len(),
                config.dns_timeout
            );
            let group = NameServerConfigGroup::from_ips_clear(&ips, 53, true);
            TokioAsyncResolver::tokio(ResolverConfig::from_parts(None, vec![], group), opts)
        };

        Ok(Self { resolver })
    }
}

impl MxResolver for TrustDnsMxResolver {
    fn lookup_mx<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
        Box::pin(async move {
            match self.resolver.mx_lookup(domain).await {
                Ok(lookup) => {
                    let preferred = lookup.iter().min_by_key(|mx| mx.preference());
                    Ok(preferred.and_then(|mx| exchanger_host(&mx.exchange().to_utf8())))
                }
                Err(e) => match e.kind() {
                    ResolveErrorKind::NoRecordsFound { .. } => Ok(None),
                    _ => Err(AppError::Dns(e)),
                },
            }
        })
    }
}

/// Strips the trailing root dot; a null MX (`.`) yields `None`.
pub(crate) fn exchanger_host(name: &str) -> Option<String> {
    let host = name.trim().trim_end_matches('.');
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}
