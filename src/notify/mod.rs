//! Best-effort notification fan-out.
//!
//! Every configured [`Channel`] is attempted in turn. A channel that fails
//! is logged and skipped; it never stops the others and never fails the run.

mod config;
mod desktop;
mod email;
mod webhook;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;

use crate::http::HttpClient;
use crate::release::Version;
use crate::runtime::Runtime;

pub use config::{NotifyConfig, SmtpConfig};
pub use desktop::DesktopChannel;
pub use email::EmailChannel;
pub use webhook::{DiscordWebhook, SlackWebhook};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A new upstream version was found
    Available,
    /// The PKGBUILD and .SRCINFO were updated and validated
    Updated,
    /// A step of the run failed
    Error,
}

impl NotificationKind {
    /// `notify-send` urgency level.
    pub fn urgency(&self) -> &'static str {
        match self {
            NotificationKind::Available => "normal",
            NotificationKind::Updated => "low",
            NotificationKind::Error => "critical",
        }
    }

    /// Prefix for chat messages.
    pub fn emoji(&self) -> &'static str {
        match self {
            NotificationKind::Available => "🔄",
            NotificationKind::Updated => "✅",
            NotificationKind::Error => "❌",
        }
    }
}

/// A message ready to be delivered on any channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    /// Full body (email, webhooks)
    pub message: String,
    /// One-line body (desktop)
    pub summary: String,
}

impl Notification {
    pub fn available(package: &str, version: &Version, release_url: &str) -> Self {
        let summary = format!("New version {} available!", version);
        Self {
            kind: NotificationKind::Available,
            title: format!("{} AUR - New Version", package),
            message: format!("{}\n{}", summary, release_url),
            summary,
        }
    }

    pub fn updated(package: &str, version: &Version, release_url: &str) -> Self {
        let summary = format!("{} updated to version {}. Files validated.", package, version);
        Self {
            kind: NotificationKind::Updated,
            title: format!("{} AUR - Updated", package),
            message: format!("{}\n{}", summary, release_url),
            summary,
        }
    }

    pub fn error(package: &str, error: &str) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: format!("{} AUR - Error", package),
            message: format!("Error during update: {}", error),
            summary: error.to_string(),
        }
    }
}

/// A delivery channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Channel: Send + Sync {
    /// Short name reported when delivery succeeds.
    fn name(&self) -> &'static str;

    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Sends notifications on every configured channel.
pub struct Notifier<'a> {
    channels: Vec<Box<dyn Channel + 'a>>,
}

impl<'a> Notifier<'a> {
    pub fn new(channels: Vec<Box<dyn Channel + 'a>>) -> Self {
        Self { channels }
    }

    /// Build the channels enabled by `config`. Unconfigured channels are skipped.
    pub fn from_config<R: Runtime>(
        config: &NotifyConfig,
        runtime: &'a R,
        http_client: &HttpClient,
        timeout: Duration,
    ) -> Self {
        let mut channels: Vec<Box<dyn Channel + 'a>> = Vec::new();

        if config.desktop {
            channels.push(Box::new(DesktopChannel::new(runtime)));
        }
        if let Some(to) = &config.email {
            channels.push(Box::new(EmailChannel::new(
                to.clone(),
                config.smtp.clone(),
                timeout,
            )));
        }
        if let Some(url) = &config.discord_webhook {
            channels.push(Box::new(DiscordWebhook::new(http_client.clone(), url.clone())));
        }
        if let Some(url) = &config.slack_webhook {
            channels.push(Box::new(SlackWebhook::new(http_client.clone(), url.clone())));
        }

        debug!(
            "Notification channels: {:?}",
            channels.iter().map(|c| c.name()).collect::<Vec<_>>()
        );
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Deliver on every channel. Returns the names of the channels that succeeded.
    #[tracing::instrument(skip(self))]
    pub async fn notify(&self, notification: &Notification) -> Vec<&'static str> {
        let mut delivered = Vec::new();

        for channel in &self.channels {
            match channel.send(notification).await {
                Ok(()) => delivered.push(channel.name()),
                Err(e) => warn!("{} notification failed: {:#}", channel.name(), e),
            }
        }

        if delivered.is_empty() {
            info!("Notification not delivered: {}", notification.summary);
        } else {
            info!("Notification sent via: {}", delivered.join(", "));
        }
        delivered
    }
}
