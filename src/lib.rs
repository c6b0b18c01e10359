//! Email deliverability checks without sending mail.
//!
//! An address goes through syntax checking, domain classification, a cached
//! MX lookup and finally an SMTP mailbox probe. [`BatchCoordinator`] runs that
//! pipeline over a list of addresses with bounded concurrency.

pub mod core;
pub mod utils;
pub mod verification;

pub use crate::core::config::{load_config, Config, ConfigBuilder, ConfigFile};
pub use crate::core::error::{AppError, Result};
pub use crate::core::models::{
    BatchRequest, BatchResponse, Principal, Reason, ValidationResult,
};
pub use crate::utils::dns::{DnsCache, MxResolver, TrustDnsMxResolver};
pub use crate::utils::smtp::{MailboxProber, ProbeMode, ProbeOutcome, ProbeStatus, SmtpProber};
pub use crate::verification::{BatchCoordinator, EmailValidator, ProgressHook};
