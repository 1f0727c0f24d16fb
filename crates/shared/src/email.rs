//! Email delivery.
//!
//! [`EmailSender`] is the capability the rest of the workspace depends on;
//! [`SmtpEmailSender`] implements it with `lettre` over SMTP.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::debug;

use crate::config::{EmailConfig, SmtpTls};

/// Email delivery errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Sender or receiver is blank or not a valid address.
    #[error("Invalid {field} address: {reason}")]
    InvalidAddress {
        /// Which address was rejected (`sender` or `receiver`).
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    Build(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    Send(String),
}

impl EmailError {
    /// Create an invalid address error.
    #[must_use]
    pub fn invalid_address(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            field,
            reason: reason.into(),
        }
    }
}

/// Delivers a single HTML email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends one message from `sender` to `receiver`.
    ///
    /// Implementations must reject a blank or malformed address with
    /// [`EmailError::InvalidAddress`] before doing any transport work.
    async fn send(
        &self,
        sender: &str,
        receiver: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), EmailError>;
}

/// Parses an address, naming the offending field on failure.
///
/// # Errors
///
/// Returns [`EmailError::InvalidAddress`] for blank or malformed input.
pub fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, EmailError> {
    if value.trim().is_empty() {
        return Err(EmailError::invalid_address(field, "address is empty"));
    }
    value
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| EmailError::invalid_address(field, e.to_string()))
}

/// Builds an HTML message after validating both addresses.
///
/// # Errors
///
/// Returns an error if an address is invalid or the message cannot be built.
pub fn build_html_message(
    sender: &str,
    receiver: &str,
    subject: &str,
    html_body: &str,
) -> Result<Message, EmailError> {
    let from = parse_mailbox("sender", sender)?;
    let to = parse_mailbox("receiver", receiver)?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html_body.to_string())
        .map_err(|e| EmailError::Build(e.to_string()))
}

/// SMTP implementation of [`EmailSender`].
#[derive(Clone)]
pub struct SmtpEmailSender {
    config: EmailConfig,
}

impl SmtpEmailSender {
    /// Creates a new SMTP sender.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Returns the SMTP configuration.
    #[must_use]
    pub const fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let host = self.config.smtp_host.as_str();
        let mut builder = match self.config.tls {
            SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| EmailError::Send(e.to_string()))?,
            SmtpTls::Wrapper => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| EmailError::Send(e.to_string()))?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        }
        .port(self.config.smtp_port);

        if !self.config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(
        &self,
        sender: &str,
        receiver: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = build_html_message(sender, receiver, subject, html_body)?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::Send(e.to_string()))?;

        debug!(smtp_host = %self.config.smtp_host, "Email handed to SMTP relay");
        Ok(())
    }
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod email_tests;
