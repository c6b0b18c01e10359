// src/cli.rs
//! Command-line arguments and input/output helpers for the binaries.

use anyhow::{bail, Context};
use clap::Parser;
use email_vetter_core::{BatchRequest, BatchResponse, ConfigBuilder, ProbeMode};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "email-vetter",
    version,
    about = "Checks email addresses for deliverability without sending mail"
)]
pub struct Cli {
    /// Address to validate. May be repeated.
    #[arg(short, long = "email", value_name = "ADDRESS")]
    pub emails: Vec<String>,

    /// File with addresses: JSON `{"emails": [...]}` or one address per line.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the JSON results here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to a TOML configuration file.
    #[arg(short, long, env = "EMAIL_VETTER_CONFIG", value_name = "FILE")]
    pub config: Option<String>,

    /// Use the lightweight single-recipient probe.
    #[arg(long)]
    pub fast: bool,

    /// Maximum number of addresses validated at once.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// DNS lookup timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub dns_timeout: Option<u64>,

    /// SMTP probe timeout in seconds for the active probe mode.
    #[arg(long, value_name = "SECS")]
    pub smtp_timeout: Option<u64>,

    /// Port used to reach mail exchangers.
    #[arg(long, value_name = "PORT")]
    pub smtp_port: Option<u16>,

    /// Envelope sender used while probing.
    #[arg(long, value_name = "ADDRESS")]
    pub sender: Option<String>,

    /// Identity recorded for this run.
    #[arg(long, env = "USER", default_value = "anonymous")]
    pub caller: String,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Layers the command-line overrides on top of `builder`.
    pub fn apply_overrides(&self, mut builder: ConfigBuilder) -> ConfigBuilder {
        if self.fast {
            builder = builder.probe_mode(ProbeMode::Fast);
        }
        if let Some(n) = self.concurrency {
            builder = builder.max_concurrency(n);
        }
        if let Some(secs) = self.dns_timeout {
            builder = builder.dns_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.smtp_timeout {
            let timeout = Duration::from_secs(secs);
            builder = if self.fast {
                builder.smtp_fast_timeout(timeout)
            } else {
                builder.smtp_timeout(timeout)
            };
        }
        if let Some(port) = self.smtp_port {
            builder = builder.smtp_port(port);
        }
        if let Some(sender) = &self.sender {
            builder = builder.smtp_sender_email(sender.clone());
        }
        builder
    }

    /// Collects addresses from `--email` flags followed by the input file.
    pub fn collect_request(&self) -> anyhow::Result<BatchRequest> {
        let mut emails = self.emails.clone();
        if let Some(path) = &self.input {
            emails.extend(read_input_file(path)?);
        }
        Ok(BatchRequest { emails })
    }
}

fn read_input_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
    parse_input(&content).with_context(|| format!("Invalid input file '{}'", path.display()))
}

/// Accepts a JSON batch request or a plain list, one address per line.
pub fn parse_input(content: &str) -> anyhow::Result<Vec<String>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') {
        let request: BatchRequest = serde_json::from_str(trimmed)?;
        return Ok(request.emails);
    }
    if trimmed.starts_with('[') {
        bail!("expected an object with an \"emails\" field, found a bare array");
    }
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub fn write_output(response: &BatchResponse, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(response)?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write results to '{}'", path.display()))?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
