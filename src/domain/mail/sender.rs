//! Mail sender abstraction
//!
//! The host mail system owns delivery, queueing and retries. This module
//! defines the seam it plugs into, plus a logging sender used when no
//! delivery backend is wired in.

use async_trait::async_trait;
use thiserror::Error;

use crate::template::{MessageSpec, TemplateError};

/// Errors from composing or handing off a message.
#[derive(Debug, Error)]
pub enum MailError {
    /// Fetching or rendering the template failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The mail system refused the message
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Delivery backend for rendered messages.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Backend identifier used in logs
    fn name(&self) -> &'static str;

    /// Hand a rendered message to the mail system.
    ///
    /// # Errors
    ///
    /// Returns `MailError::Delivery` if the backend rejects the message.
    async fn send(&self, recipient: &str, message: &MessageSpec) -> Result<(), MailError>;
}

/// Sender that writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogMailSender {
    default_from: Option<String>,
}

impl LogMailSender {
    pub fn new(default_from: Option<String>) -> Self {
        Self { default_from }
    }
}

#[async_trait]
impl MailSender for LogMailSender {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, recipient: &str, message: &MessageSpec) -> Result<(), MailError> {
        let from = message
            .from
            .as_ref()
            .map(|address| address.email.as_str())
            .or(self.default_from.as_deref())
            .unwrap_or("");

        tracing::info!(
            recipient = %recipient,
            from = %from,
            reply_to = ?message.reply_to,
            subject = ?message.subject,
            html_bytes = message.html.len(),
            has_text = message.text.is_some(),
            "Mail message accepted (log sender)"
        );

        Ok(())
    }
}
