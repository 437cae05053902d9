//! Fetch → render → send orchestration

use std::sync::Arc;

use crate::metrics::MailMetrics;
use crate::template::{build_message, MessageSpec, RenderContext, TemplateFetcher, TemplateId};

use super::sender::{MailError, MailSender};

/// Composes messages from remote templates and hands them to a sender.
pub struct TemplateMailer {
    fetcher: Arc<TemplateFetcher>,
    sender: Arc<dyn MailSender>,
}

impl TemplateMailer {
    pub fn new(fetcher: Arc<TemplateFetcher>, sender: Arc<dyn MailSender>) -> Self {
        Self { fetcher, sender }
    }

    /// Fetch a template and render it with `data`.
    ///
    /// Fetch errors propagate unchanged.
    pub async fn compose(
        &self,
        template_id: &TemplateId,
        data: &RenderContext,
    ) -> Result<MessageSpec, MailError> {
        let template = self.fetcher.fetch_template(template_id).await?;
        let message = build_message(&template, data);

        MailMetrics::record_composed();

        Ok(message)
    }

    /// Compose a message and hand it to the sender.
    #[tracing::instrument(name = "mail.send", skip_all, fields(template_id = %template_id, sender = self.sender.name()))]
    pub async fn send(
        &self,
        template_id: &TemplateId,
        recipient: &str,
        data: &RenderContext,
    ) -> Result<MessageSpec, MailError> {
        validate_recipient(recipient)?;

        let message = self.compose(template_id, data).await?;

        match self.sender.send(recipient, &message).await {
            Ok(()) => {
                MailMetrics::record_sent();
                tracing::info!(recipient = %recipient, "Templated mail handed to sender");
                Ok(message)
            }
            Err(e) => {
                MailMetrics::record_failed();
                tracing::error!(recipient = %recipient, error = %e, "Mail sender rejected message");
                Err(e)
            }
        }
    }
}

fn validate_recipient(recipient: &str) -> Result<(), MailError> {
    let trimmed = recipient.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(MailError::InvalidRecipient(recipient.to_string())),
    }
}
