//! Fluent construction of [`Config`]: defaults, then a config file, then
//! explicit overrides, in the order the methods are called.

use super::file::ConfigFile;
use super::validation::validate_config;
use super::Config;
use crate::core::error::{AppError, Result};
use crate::utils::smtp::ProbeMode;
use crate::verification::classifier::{normalize_entries, ClassificationSets};
use regex::Regex;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
    email_pattern: Option<String>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every value present in `file`; absent values keep their current setting.
    pub fn with_config_file(mut self, file: ConfigFile, path: Option<String>) -> Self {
        let c = &mut self.config;

        if let Some(secs) = file.dns.dns_timeout {
            c.dns_timeout = Duration::from_secs(secs);
        }
        if let Some(servers) = file.dns.dns_servers {
            c.dns_servers = servers;
        }
        if let Some(secs) = file.dns.cache_ttl {
            c.dns_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(workers) = file.dns.workers {
            c.dns_workers = workers;
        }

        if let Some(secs) = file.smtp.smtp_timeout {
            c.smtp_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.smtp.fast_timeout {
            c.smtp_fast_timeout = Duration::from_secs(secs);
        }
        if let Some(port) = file.smtp.port {
            c.smtp_port = port;
        }
        if let Some(name) = file.smtp.hello_name {
            c.smtp_hello_name = name;
        }
        if let Some(sender) = file.smtp.smtp_sender_email {
            c.smtp_sender_email = sender;
        }
        if let Some(mode) = file.smtp.probe_mode {
            c.probe_mode = mode;
        }

        if let Some(n) = file.batch.max_concurrency {
            c.max_concurrency = n;
        }
        if let Some(n) = file.batch.max_batch_size {
            c.max_batch_size = n;
        }

        let sets = &mut c.classification;
        if let Some(list) = file.classification.known_valid_major {
            sets.known_valid_major = normalize_entries(list);
        }
        if let Some(list) = file.classification.known_valid_other {
            sets.known_valid_other = normalize_entries(list);
        }
        if let Some(list) = file.classification.disposable {
            sets.disposable = normalize_entries(list);
        }
        if let Some(list) = file.classification.spam_trap {
            sets.spam_trap = normalize_entries(list);
        }
        if let Some(list) = file.classification.role_prefixes {
            sets.role_prefixes = normalize_entries(list);
        }
        if file.classification.email_pattern.is_some() {
            self.email_pattern = file.classification.email_pattern;
        }

        self.config.loaded_config_path = path;
        self
    }

    pub fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.config.dns_timeout = timeout;
        self
    }

    pub fn dns_servers(mut self, servers: Vec<String>) -> Self {
        self.config.dns_servers = servers;
        self
    }

    pub fn dns_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.dns_cache_ttl = ttl;
        self
    }

    pub fn dns_workers(mut self, workers: usize) -> Self {
        self.config.dns_workers = workers;
        self
    }

    pub fn smtp_timeout(mut self, timeout: Duration) -> Self {
        self.config.smtp_timeout = timeout;
        self
    }

    pub fn smtp_fast_timeout(mut self, timeout: Duration) -> Self {
        self.config.smtp_fast_timeout = timeout;
        self
    }

    pub fn smtp_port(mut self, port: u16) -> Self {
        self.config.smtp_port = port;
        self
    }

    pub fn smtp_hello_name(mut self, name: impl Into<String>) -> Self {
        self.config.smtp_hello_name = name.into();
        self
    }

    pub fn smtp_sender_email(mut self, sender: impl Into<String>) -> Self {
        self.config.smtp_sender_email = sender.into();
        self
    }

    pub fn probe_mode(mut self, mode: ProbeMode) -> Self {
        self.config.probe_mode = mode;
        self
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.config.max_concurrency = n;
        self
    }

    pub fn max_batch_size(mut self, n: usize) -> Self {
        self.config.max_batch_size = n;
        self
    }

    pub fn email_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.email_pattern = Some(pattern.into());
        self
    }

    pub fn classification(mut self, sets: ClassificationSets) -> Self {
        self.config.classification = sets;
        self
    }

    /// Finalises the configuration and runs validation.
    pub fn build(self) -> Result<Config> {
        let mut config = self.config;
        if let Some(pattern) = self.email_pattern {
            config.email_regex = Regex::new(&pattern).map_err(|e| {
                AppError::Config(format!("Invalid email pattern '{}': {}", pattern, e))
            })?;
        }
        validate_config(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.max_concurrency, 50);
        assert!(config.loaded_config_path.is_none());
    }

    #[test]
    fn explicit_overrides_win_over_file() {
        let file = ConfigFile::from_toml_str(
            "[batch]\nmax_concurrency = 10\n[smtp]\nport = 2525\nprobe_mode = \"fast\"\n",
        )
        .unwrap();
        let config = ConfigBuilder::new()
            .with_config_file(file, Some("email-vetter.toml".into()))
            .max_concurrency(5)
            .build()
            .unwrap();
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.probe_mode, ProbeMode::Fast);
        assert_eq!(config.loaded_config_path.as_deref(), Some("email-vetter.toml"));
    }

    #[test]
    fn file_lists_replace_builtin_sets() {
        let file = ConfigFile::from_toml_str(
            "[classification]\ndisposable = [\"Burner.TEST\"]\n",
        )
        .unwrap();
        let config = ConfigBuilder::new().with_config_file(file, None).build().unwrap();
        assert_eq!(config.classification.disposable.len(), 1);
        assert!(config.classification.disposable.contains("burner.test"));
        assert!(config.classification.known_valid_major.contains("gmail.com"));
    }

    #[test]
    fn bad_email_pattern_is_config_error() {
        let err = ConfigBuilder::new().email_pattern("([a-z").build().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
