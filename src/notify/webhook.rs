//! Discord and Slack incoming webhooks.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::http::HttpClient;

use super::{Channel, Notification};

/// Display name used for Discord messages.
pub const DISCORD_USERNAME: &str = "aurbump";

#[derive(Serialize, Debug, PartialEq)]
struct DiscordPayload<'a> {
    content: String,
    username: &'a str,
}

#[derive(Serialize, Debug, PartialEq)]
struct SlackPayload {
    text: String,
}

pub struct DiscordWebhook {
    http_client: HttpClient,
    url: String,
}

impl DiscordWebhook {
    pub fn new(http_client: HttpClient, url: String) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl Channel for DiscordWebhook {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let payload = DiscordPayload {
            content: format!(
                "{} {}\n{}",
                notification.kind.emoji(),
                notification.title,
                notification.message
            ),
            username: DISCORD_USERNAME,
        };
        self.http_client.post_json(&self.url, &payload).await
    }
}

pub struct SlackWebhook {
    http_client: HttpClient,
    url: String,
}

impl SlackWebhook {
    pub fn new(http_client: HttpClient, url: String) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl Channel for SlackWebhook {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let payload = SlackPayload {
            text: format!("{}\n{}", notification.title, notification.message),
        };
        self.http_client.post_json(&self.url, &payload).await
    }
}
