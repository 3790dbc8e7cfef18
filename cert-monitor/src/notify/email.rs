use super::Notifier;
use crate::config::EmailSettings;
use crate::digest;
use crate::types::{Item, MonitorError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::debug;

pub const PASSWORD_ENV: &str = "EMAIL_PASSWORD";

/// Sends the HTML digest over SMTP with STARTTLS.
///
/// The account password is read from `EMAIL_PASSWORD` at send time and the
/// sender address doubles as the SMTP username.
pub struct EmailNotifier {
    settings: EmailSettings,
}

impl EmailNotifier {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    fn error(&self, message: impl std::fmt::Display) -> MonitorError {
        MonitorError::notify(self.name(), message)
    }

    pub fn build_message(&self, items: &[Item], now: DateTime<Utc>) -> Result<Message> {
        let from: Mailbox = self
            .settings
            .from_email
            .parse()
            .map_err(|e| self.error(format!("invalid from_email '{}': {}", self.settings.from_email, e)))?;

        if self.settings.to_emails.is_empty() {
            return Err(self.error("no recipients configured"));
        }

        let mut builder = Message::builder().from(from).subject(digest::email_subject(now));
        for address in &self.settings.to_emails {
            let to: Mailbox = address
                .parse()
                .map_err(|e| self.error(format!("invalid recipient '{}': {}", address, e)))?;
            builder = builder.to(to);
        }

        builder
            .header(header::ContentType::TEXT_HTML)
            .body(digest::email_html(items, now))
            .map_err(|e| self.error(e))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, items: &[Item]) -> Result<()> {
        let password = std::env::var(PASSWORD_ENV)
            .map_err(|_| self.error(format!("{} environment variable not set", PASSWORD_ENV)))?;

        let message = self.build_message(items, Utc::now())?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.smtp_server)
            .map_err(|e| self.error(e))?
            .port(self.settings.smtp_port)
            .credentials(Credentials::new(self.settings.from_email.clone(), password))
            .build();

        debug!(
            server = %self.settings.smtp_server,
            port = self.settings.smtp_port,
            recipients = self.settings.to_emails.len(),
            "Sending email digest"
        );
        mailer.send(message).await.map_err(|e| self.error(e))?;
        Ok(())
    }
}
