// src/main.rs
mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use email_vetter_core::{load_config, AppError, BatchCoordinator, EmailValidator, Principal};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    bar.set_style(style);
    bar
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli
        .apply_overrides(load_config(cli.config.as_deref())?)
        .build()
        .context("Invalid configuration")?;
    tracing::debug!(target: "config", "Effective configuration: {:?}", config);

    let request = cli.collect_request()?;
    let validator = Arc::new(EmailValidator::from_config(&config)?);
    let mut coordinator = BatchCoordinator::from_config(Arc::clone(&validator), &config);
    coordinator.check_request(&request)?;

    let bar = (!cli.no_progress).then(|| progress_bar(request.emails.len()));
    if let Some(bar) = &bar {
        let bar = bar.clone();
        coordinator = coordinator.with_progress(Arc::new(move |_| bar.inc(1)));
    }

    let caller = Principal::new(cli.caller.clone());
    let response = coordinator.validate_batch(&caller, request).await?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    tracing::debug!(
        target: "dns_cache",
        "{} domain(s) held in the MX cache",
        validator.dns_cache().len()
    );

    cli::write_output(&response, cli.output.as_deref())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let client_error = e
                .downcast_ref::<AppError>()
                .is_some_and(AppError::is_client_error);
            eprintln!("Error: {e:#}");
            if client_error {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
