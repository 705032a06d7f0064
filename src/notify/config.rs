use log::warn;

use crate::runtime::Runtime;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP settings for the email channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SMTP_SERVER.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            from: None,
        }
    }
}

/// Which notification channels are enabled, read from the environment.
///
/// | Variable | Effect |
/// |---|---|
/// | `NOTIFY_DESKTOP` | truthy value enables `notify-send` |
/// | `NOTIFICATION_EMAIL` | recipient; enables email |
/// | `SMTP_SERVER`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM_EMAIL` | SMTP settings |
/// | `DISCORD_WEBHOOK_URL` | enables Discord |
/// | `SLACK_WEBHOOK_URL` | enables Slack |
///
/// Empty values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyConfig {
    pub desktop: bool,
    pub email: Option<String>,
    pub smtp: SmtpConfig,
    pub discord_webhook: Option<String>,
    pub slack_webhook: Option<String>,
}

impl NotifyConfig {
    pub fn from_runtime<R: Runtime + ?Sized>(runtime: &R) -> Self {
        let env = |key: &str| {
            runtime
                .env_var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match env("SMTP_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "Invalid SMTP_PORT '{}', using {}",
                    raw, DEFAULT_SMTP_PORT
                );
                DEFAULT_SMTP_PORT
            }),
            None => DEFAULT_SMTP_PORT,
        };

        Self {
            desktop: env("NOTIFY_DESKTOP").is_some_and(|v| is_truthy(&v)),
            email: env("NOTIFICATION_EMAIL"),
            smtp: SmtpConfig {
                server: env("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
                port,
                username: env("SMTP_USERNAME"),
                password: env("SMTP_PASSWORD"),
                from: env("SMTP_FROM_EMAIL"),
            },
            discord_webhook: env("DISCORD_WEBHOOK_URL"),
            slack_webhook: env("SLACK_WEBHOOK_URL"),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
