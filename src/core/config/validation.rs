//! Sanity checks applied to a fully built [`Config`].

use super::Config;
use crate::core::error::{AppError, Result};
use std::net::IpAddr;
use std::time::Duration;

pub(crate) fn validate_config(config: &Config) -> Result<()> {
    ensure_nonzero(config.dns_timeout, "dns_timeout")?;
    ensure_nonzero(config.smtp_timeout, "smtp_timeout")?;
    ensure_nonzero(config.smtp_fast_timeout, "smtp_fast_timeout")?;

    if config.dns_workers == 0 {
        return Err(AppError::Config("dns_workers must be at least 1".into()));
    }
    if config.max_concurrency == 0 {
        return Err(AppError::Config("max_concurrency must be at least 1".into()));
    }
    if config.max_batch_size == 0 {
        return Err(AppError::Config("max_batch_size must be at least 1".into()));
    }
    if config.smtp_port == 0 {
        return Err(AppError::Config("smtp_port must not be 0".into()));
    }

    for server in &config.dns_servers {
        server.parse::<IpAddr>().map_err(|e| {
            AppError::Config(format!("Invalid DNS server address '{}': {}", server, e))
        })?;
    }

    if config.smtp_hello_name.trim().is_empty() {
        return Err(AppError::Config("smtp_hello_name must not be empty".into()));
    }
    config
        .smtp_sender_email
        .parse::<lettre::Address>()
        .map_err(|e| {
            AppError::Config(format!(
                "Invalid smtp_sender_email '{}': {}",
                config.smtp_sender_email, e
            ))
        })?;

    let conflicts = config.classification.conflicting_domains();
    if !conflicts.is_empty() {
        tracing::warn!(
            target: "config",
            "{} domain(s) are listed as both rejected and known-valid; rejection wins: {}",
            conflicts.len(),
            conflicts.join(", ")
        );
    }

    Ok(())
}

fn ensure_nonzero(value: Duration, name: &str) -> Result<()> {
    if value.is_zero() {
        Err(AppError::Config(format!("{} must be greater than zero", name)))
    } else {
        Ok(())
    }
}
