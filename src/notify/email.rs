use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::debug;
use std::time::Duration;

use super::{Channel, Notification, SmtpConfig};

/// Email over SMTP with STARTTLS.
pub struct EmailChannel {
    to: String,
    smtp: SmtpConfig,
    timeout: Duration,
}

impl EmailChannel {
    pub fn new(to: String, smtp: SmtpConfig, timeout: Duration) -> Self {
        Self { to, smtp, timeout }
    }

    fn message(&self, from: &str, notification: &Notification) -> Result<Message> {
        let from: Mailbox = from
            .parse()
            .with_context(|| format!("Invalid sender address '{}'", from))?;
        let to: Mailbox = self
            .to
            .parse()
            .with_context(|| format!("Invalid recipient address '{}'", self.to))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(notification.title.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.message.clone())
            .context("Failed to build email")
    }
}

#[async_trait]
impl Channel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let (Some(username), Some(password), Some(from)) = (
            self.smtp.username.as_deref(),
            self.smtp.password.as_deref(),
            self.smtp.from.as_deref(),
        ) else {
            anyhow::bail!(
                "Incomplete SMTP configuration (SMTP_USERNAME, SMTP_PASSWORD and SMTP_FROM_EMAIL are required)"
            );
        };

        let message = self.message(from, notification)?;

        debug!(
            "Sending email to {} via {}:{}",
            self.to, self.smtp.server, self.smtp.port
        );
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.server)
            .with_context(|| format!("Invalid SMTP server '{}'", self.smtp.server))?
            .port(self.smtp.port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(self.timeout))
            .build();

        mailer
            .send(message)
            .await
            .context("SMTP delivery failed")?;
        Ok(())
    }
}
