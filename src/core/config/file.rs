//! Defines the structure mirroring the TOML configuration file format.

use crate::utils::smtp::ProbeMode;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) dns: DnsConfig,
    #[serde(default)]
    pub(crate) smtp: SmtpConfig,
    #[serde(default)]
    pub(crate) batch: BatchConfig,
    #[serde(default)]
    pub(crate) classification: ClassificationConfig,
}

impl ConfigFile {
    /// Parses the TOML text of a configuration file.
    pub fn from_toml_str(content: &str) -> crate::core::error::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DnsConfig {
    pub(crate) dns_timeout: Option<u64>,
    pub(crate) dns_servers: Option<Vec<String>>,
    pub(crate) cache_ttl: Option<u64>,
    pub(crate) workers: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct SmtpConfig {
    pub(crate) smtp_timeout: Option<u64>,
    pub(crate) fast_timeout: Option<u64>,
    pub(crate) port: Option<u16>,
    pub(crate) hello_name: Option<String>,
    pub(crate) smtp_sender_email: Option<String>,
    pub(crate) probe_mode: Option<ProbeMode>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct BatchConfig {
    pub(crate) max_concurrency: Option<usize>,
    pub(crate) max_batch_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ClassificationConfig {
    pub(crate) email_pattern: Option<String>,
    pub(crate) known_valid_major: Option<Vec<String>>,
    pub(crate) known_valid_other: Option<Vec<String>>,
    pub(crate) disposable: Option<Vec<String>>,
    pub(crate) spam_trap: Option<Vec<String>>,
    pub(crate) role_prefixes: Option<Vec<String>>,
}
