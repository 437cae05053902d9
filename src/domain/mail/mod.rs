//! Mail composition and hand-off.
//!
//! `TemplateMailer` fetches a template, renders it and passes the resulting
//! `MessageSpec` to a `MailSender`. Delivery itself belongs to the host.

mod mailer;
mod sender;

pub use mailer::TemplateMailer;
pub use sender::{LogMailSender, MailError, MailSender};
