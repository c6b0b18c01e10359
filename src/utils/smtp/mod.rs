//! SMTP mailbox probing.

pub mod probe;
pub mod result;

pub use probe::SmtpProber;
pub use result::{ProbeOutcome, ProbeStatus};

use futures::future::BoxFuture;
use serde::Deserialize;

/// Which probe the production prober runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// Target check followed by a catch-all check.
    #[default]
    Advanced,
    /// Target check only, with a shorter timeout.
    Fast,
}

/// Tests whether a mail exchanger accepts `address`.
///
/// Implementations never fail; every problem is folded into a [`ProbeOutcome`].
pub trait MailboxProber: Send + Sync {
    fn probe<'a>(
        &'a self,
        exchanger: &'a str,
        address: &'a str,
        domain: &'a str,
    ) -> BoxFuture<'a, ProbeOutcome>;
}
