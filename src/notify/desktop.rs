use anyhow::Result;
use async_trait::async_trait;

use crate::runtime::{CommandSpec, Runtime};

use super::{Channel, Notification};

/// Desktop notification through `notify-send`.
pub struct DesktopChannel<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> DesktopChannel<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    fn command(notification: &Notification) -> CommandSpec {
        CommandSpec::new("notify-send")
            .arg("-u")
            .arg(notification.kind.urgency())
            .arg(notification.title.as_str())
            .arg(notification.summary.as_str())
    }
}

#[async_trait]
impl<'a, R: Runtime> Channel for DesktopChannel<'a, R> {
    fn name(&self) -> &'static str {
        "desktop"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let output = self.runtime.run(&Self::command(notification)).await?;
        if !output.success {
            anyhow::bail!(
                "notify-send exited with {:?}: {}",
                output.code,
                output.stderr.trim()
            );
        }
        Ok(())
    }
}
