//! Protocol-level mailbox probing over a single short-lived SMTP session.
//!
//! The dialogue always stops after `RCPT TO`: no `DATA` is ever sent, and the
//! session is closed with `QUIT` (or dropped on timeout) whatever the outcome.

use super::result::ProbeOutcome;
use super::{MailboxProber, ProbeMode};
use crate::core::config::Config;
use crate::core::error::Result;
use futures::future::BoxFuture;
use lettre::transport::smtp::client::AsyncSmtpConnection;
use lettre::transport::smtp::commands::Mail;
use lettre::transport::smtp::extension::ClientId;
use lettre::transport::smtp::response::Code;
use lettre::Address;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;
use std::time::{Duration, Instant};

const ACCEPTED: u16 = 250;
const DECOY_LOCAL_PART_LEN: usize = 16;

/// `RCPT TO` carrying the address exactly as given.
///
/// Recipients skip lettre's `Address` parsing, which refuses some local parts
/// (`john..doe`, a leading or trailing dot) that mail servers answer for.
/// Only characters that could break the command line are refused.
#[derive(Debug, Clone, Copy)]
struct RecipientCommand<'a>(&'a str);

impl<'a> RecipientCommand<'a> {
    fn new(address: &'a str) -> Option<Self> {
        let fits = !address.is_empty()
            && address
                .chars()
                .all(|c| !c.is_control() && !c.is_whitespace() && c != '<' && c != '>');
        fits.then_some(Self(address))
    }
}

impl fmt::Display for RecipientCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RCPT TO:<{}>\r\n", self.0)
    }
}

/// Reply to a `RCPT TO` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecipientReply {
    Accepted,
    Rejected(u16),
}

/// Probes mail exchangers on behalf of the validation pipeline.
#[derive(Debug, Clone)]
pub struct SmtpProber {
    hello_name: String,
    sender: Address,
    port: u16,
    timeout: Duration,
    fast_timeout: Duration,
    mode: ProbeMode,
}

impl SmtpProber {
    pub fn new(
        hello_name: impl Into<String>,
        sender: Address,
        port: u16,
        timeout: Duration,
        fast_timeout: Duration,
        mode: ProbeMode,
    ) -> Self {
        Self {
            hello_name: hello_name.into(),
            sender,
            port,
            timeout,
            fast_timeout,
            mode,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let sender: Address = config.smtp_sender_email.parse()?;
        Ok(Self::new(
            config.smtp_hello_name.clone(),
            sender,
            config.smtp_port,
            config.smtp_timeout,
            config.smtp_fast_timeout,
            config.probe_mode,
        ))
    }

    pub fn mode(&self) -> ProbeMode {
        self.mode
    }

    /// Target check followed by a catch-all check with a fabricated local part.
    ///
    /// Any connection or protocol failure, and the overall timeout, map to
    /// `smtp_unreachable`.
    pub async fn probe_advanced(&self, exchanger: &str, address: &str, domain: &str) -> ProbeOutcome {
        let task_label = format!("[SMTP Probe: {} via {}]", address, exchanger);
        let decoy = format!("{}@{}", random_local_part(), domain);
        tracing::debug!(target: "smtp_probe", "{} Starting advanced probe", task_label);
        let start_time = Instant::now();

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.catch_all_dialogue(exchanger, address, &decoy),
        )
        .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => ProbeOutcome::unreachable(format!("SMTP unreachable: {}", e)),
            Err(_) => ProbeOutcome::unreachable(format!(
                "SMTP unreachable: no complete dialogue within {:?}",
                self.timeout
            )),
        };

        tracing::debug!(
            target: "smtp_probe",
            "{} Finished in {:.2?}: {}",
            task_label,
            start_time.elapsed(),
            outcome
        );
        outcome
    }

    /// Single recipient check with the shorter timeout and no catch-all step.
    ///
    /// 250 is verified, 550-554 not verified, anything else a server error.
    /// Only the overall timeout maps to `smtp_unreachable`.
    pub async fn probe_fast(&self, exchanger: &str, address: &str) -> ProbeOutcome {
        let task_label = format!("[SMTP Fast Probe: {} via {}]", address, exchanger);
        let start_time = Instant::now();

        let outcome = match tokio::time::timeout(
            self.fast_timeout,
            self.single_recipient_dialogue(exchanger, address),
        )
        .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => ProbeOutcome::server_error(format!("SMTP error: {}", e)),
            Err(_) => ProbeOutcome::unreachable(format!(
                "SMTP unreachable: no reply within {:?}",
                self.fast_timeout
            )),
        };

        tracing::debug!(
            target: "smtp_probe",
            "{} Finished in {:.2?}: {}",
            task_label,
            start_time.elapsed(),
            outcome
        );
        outcome
    }

    async fn catch_all_dialogue(
        &self,
        exchanger: &str,
        address: &str,
        decoy: &str,
    ) -> Result<ProbeOutcome> {
        let (Some(target), Some(decoy)) =
            (RecipientCommand::new(address), RecipientCommand::new(decoy))
        else {
            return Ok(unusable_recipient(address));
        };

        let mut conn = self.connect(exchanger, self.timeout).await?;
        let outcome = self.run_catch_all(&mut conn, target, decoy).await;
        close(&mut conn).await;
        outcome
    }

    async fn run_catch_all(
        &self,
        conn: &mut AsyncSmtpConnection,
        target: RecipientCommand<'_>,
        decoy: RecipientCommand<'_>,
    ) -> Result<ProbeOutcome> {
        self.declare_sender(conn).await?;

        if let RecipientReply::Rejected(code) = declare_recipient(conn, target).await? {
            return Ok(ProbeOutcome::not_verified(format!(
                "Mailbox rejected with code {}",
                code
            )));
        }

        match declare_recipient(conn, decoy).await? {
            RecipientReply::Accepted => Ok(ProbeOutcome::catch_all(format!(
                "Domain is a catch-all (accepted {})",
                decoy.0
            ))),
            RecipientReply::Rejected(_) => Ok(ProbeOutcome::verified("Mailbox exists")),
        }
    }

    async fn single_recipient_dialogue(&self, exchanger: &str, address: &str) -> Result<ProbeOutcome> {
        let Some(target) = RecipientCommand::new(address) else {
            return Ok(unusable_recipient(address));
        };

        let mut conn = self.connect(exchanger, self.fast_timeout).await?;
        let outcome = match self.declare_sender(&mut conn).await {
            Ok(()) => declare_recipient(&mut conn, target).await.map(|reply| match reply {
                RecipientReply::Accepted => ProbeOutcome::verified("Mailbox exists"),
                RecipientReply::Rejected(code) if (550..=554).contains(&code) => {
                    ProbeOutcome::not_verified(format!("Mailbox rejected (code {})", code))
                }
                RecipientReply::Rejected(code) => {
                    ProbeOutcome::server_error(format!("Unexpected response code {}", code))
                }
            }),
            Err(e) => Err(e),
        };
        close(&mut conn).await;
        outcome
    }

    /// Opens the session; lettre reads the greeting and issues `EHLO`.
    async fn connect(&self, exchanger: &str, timeout: Duration) -> Result<AsyncSmtpConnection> {
        let hello = ClientId::Domain(self.hello_name.clone());
        let conn = AsyncSmtpConnection::connect_tokio1(
            (exchanger, self.port),
            Some(timeout),
            &hello,
            None,
            None,
        )
        .await?;
        Ok(conn)
    }

    async fn declare_sender(&self, conn: &mut AsyncSmtpConnection) -> Result<()> {
        conn.command(Mail::new(Some(self.sender.clone()), vec![]))
            .await?;
        Ok(())
    }
}

impl MailboxProber for SmtpProber {
    fn probe<'a>(
        &'a self,
        exchanger: &'a str,
        address: &'a str,
        domain: &'a str,
    ) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            match self.mode {
                ProbeMode::Advanced => self.probe_advanced(exchanger, address, domain).await,
                ProbeMode::Fast => self.probe_fast(exchanger, address).await,
            }
        })
    }
}

/// Negative SMTP replies come back from lettre as errors carrying the code.
async fn declare_recipient(
    conn: &mut AsyncSmtpConnection,
    recipient: RecipientCommand<'_>,
) -> Result<RecipientReply> {
    match conn.command(recipient).await {
        Ok(response) => {
            let code = reply_code(&response.code());
            if code == ACCEPTED {
                Ok(RecipientReply::Accepted)
            } else {
                Ok(RecipientReply::Rejected(code))
            }
        }
        Err(e) if e.is_permanent() || e.is_transient() => Ok(RecipientReply::Rejected(
            e.status().map(|code| reply_code(&code)).unwrap_or(0),
        )),
        Err(e) => Err(e.into()),
    }
}

fn unusable_recipient(address: &str) -> ProbeOutcome {
    ProbeOutcome::not_verified(format!("{:?} cannot be sent as an SMTP recipient", address))
}

async fn close(conn: &mut AsyncSmtpConnection) {
    if let Err(e) = conn.quit().await {
        tracing::debug!(target: "smtp_probe", "QUIT failed: {}", e);
    }
}

fn reply_code(code: &Code) -> u16 {
    code.to_string().parse().unwrap_or(0)
}

/// Local part that is all but certain not to name a real mailbox.
fn random_local_part() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DECOY_LOCAL_PART_LEN)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
