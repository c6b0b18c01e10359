//! Defines the custom error types for the email-vetter application.
//!
//! Per-address outcomes are never errors: they are [`Reason`](crate::core::models::Reason)
//! values. `AppError` covers setup problems, malformed requests, and the
//! transport failures that the probe and resolver map into outcomes internally.

use std::{io, net::AddrParseError};
use thiserror::Error;

/// The primary error type for the validation engine.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error occurring during configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error initializing necessary components (e.g., resolvers).
    #[error("Initialization Error: {0}")]
    Initialization(String),

    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization or deserialization.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error parsing the TOML configuration file.
    #[error("TOML Error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Error during DNS resolution.
    #[error("DNS Resolution Error: {0}")]
    Dns(#[from] trust_dns_resolver::error::ResolveError),

    /// A DNS lookup did not answer within the configured timeout.
    #[error("DNS Timeout for domain: {0}")]
    DnsTimeout(String),

    /// Error during SMTP communication setup or command execution.
    #[error("SMTP Error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// An address could not be encoded as an SMTP envelope address.
    #[error("Mail Address Error: {0}")]
    MailAddress(#[from] lettre::address::AddressError),

    /// Error parsing an IP address or socket address.
    #[error("Address Parsing Error: {0}")]
    AddrParse(#[from] AddrParseError),

    /// Error related to concurrency or task execution.
    #[error("Task Execution Error: {0}")]
    Task(String),

    /// A batch request carried no addresses.
    #[error("No emails provided")]
    EmptyBatch,

    /// A batch request carried more addresses than the configured maximum.
    #[error("Maximum {max} emails allowed, got {count}")]
    BatchTooLarge {
        /// Number of addresses in the rejected request.
        count: usize,
        /// Configured upper bound.
        max: usize,
    },
}

impl AppError {
    /// True for rejections caused by the shape of the request rather than the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::EmptyBatch | AppError::BatchTooLarge { .. })
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
