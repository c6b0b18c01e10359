//! Defines the core runtime `Config` struct, its defaults, and related utilities.
//! Submodules handle loading, building, and validation.

pub(crate) mod builder;
pub(crate) mod file;
pub(crate) mod loading;
pub(crate) mod validation;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;
pub use loading::{load_config, DEFAULT_CONFIG_FILE};

use crate::utils::smtp::ProbeMode;
use crate::verification::classifier::ClassificationSets;
use crate::verification::syntax::DEFAULT_EMAIL_REGEX;
use regex::Regex;
use std::time::Duration;

/// Runtime configuration settings used by the email-vetter core logic.
#[derive(Clone)]
pub struct Config {
    pub dns_timeout: Duration,
    pub dns_servers: Vec<String>,
    pub dns_cache_ttl: Duration,
    pub dns_workers: usize,

    pub smtp_timeout: Duration,
    pub smtp_fast_timeout: Duration,
    pub smtp_port: u16,
    pub smtp_hello_name: String,
    pub smtp_sender_email: String,
    pub probe_mode: ProbeMode,

    pub max_concurrency: usize,
    pub max_batch_size: usize,

    pub email_regex: Regex,
    pub classification: ClassificationSets,

    pub loaded_config_path: Option<String>,
}

impl Config {
    fn build_default() -> Self {
        let dns_servers = vec![
            "8.8.8.8".to_string(),
            "8.8.4.4".to_string(),
            "1.1.1.1".to_string(),
            "1.0.0.1".to_string(),
        ];

        Config {
            dns_timeout: Duration::from_secs(5),
            dns_servers,
            dns_cache_ttl: Duration::from_secs(3600),
            dns_workers: 20,
            smtp_timeout: Duration::from_secs(8),
            smtp_fast_timeout: Duration::from_secs(5),
            smtp_port: 25,
            smtp_hello_name: "probe.email-vetter.invalid".to_string(),
            smtp_sender_email: "verify-probe@email-vetter.invalid".to_string(),
            probe_mode: ProbeMode::Advanced,
            max_concurrency: 50,
            max_batch_size: 1000,
            email_regex: DEFAULT_EMAIL_REGEX.clone(),
            classification: ClassificationSets::builtin(),
            loaded_config_path: None,
        }
    }

    /// Timeout that bounds a whole probe in the configured mode.
    pub fn active_smtp_timeout(&self) -> Duration {
        match self.probe_mode {
            ProbeMode::Advanced => self.smtp_timeout,
            ProbeMode::Fast => self.smtp_fast_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::build_default()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("dns_timeout", &self.dns_timeout)
            .field("dns_servers_count", &self.dns_servers.len())
            .field("dns_cache_ttl", &self.dns_cache_ttl)
            .field("dns_workers", &self.dns_workers)
            .field("smtp_timeout", &self.smtp_timeout)
            .field("smtp_fast_timeout", &self.smtp_fast_timeout)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_hello_name", &self.smtp_hello_name)
            .field("smtp_sender_email", &self.smtp_sender_email)
            .field("probe_mode", &self.probe_mode)
            .field("max_concurrency", &self.max_concurrency)
            .field("max_batch_size", &self.max_batch_size)
            .field("email_regex", &self.email_regex.as_str())
            .field(
                "known_valid_major_count",
                &self.classification.known_valid_major.len(),
            )
            .field(
                "known_valid_other_count",
                &self.classification.known_valid_other.len(),
            )
            .field("disposable_count", &self.classification.disposable.len())
            .field("spam_trap_count", &self.classification.spam_trap.len())
            .field("role_prefixes_count", &self.classification.role_prefixes.len())
            .field("loaded_config_path", &self.loaded_config_path)
            .finish()
    }
}
