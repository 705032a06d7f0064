use anyhow::Result;
use log::info;

use crate::{
    application::{CheckAction, CheckOutcome},
    notify::Notifier,
    runtime::Runtime,
};

use super::config::{Config, Options};

/// Run one update cycle. Every run outcome is `Ok`; only invalid
/// configuration is an error.
#[tracing::instrument(skip(runtime, options))]
pub async fn check<R: Runtime>(runtime: R, options: &Options) -> Result<()> {
    let config = Config::new(runtime, options)?;
    let outcome = run(&config).await;
    info!("Run finished: {}", summary(&outcome));
    Ok(())
}

pub async fn run<R: Runtime>(config: &Config<R>) -> CheckOutcome {
    let notifier = Notifier::from_config(
        &config.notify,
        &config.runtime,
        &config.http_client,
        config.timeout,
    );
    let action = CheckAction::new(
        &config.runtime,
        &config.source,
        &config.http_client,
        &notifier,
        &config.settings,
    );
    action.run().await
}

fn summary(outcome: &CheckOutcome) -> String {
    match outcome {
        CheckOutcome::FetchFailed => "latest release unavailable, nothing changed".to_string(),
        CheckOutcome::UpToDate(version) => format!("up to date at {}", version),
        CheckOutcome::Updated { version, .. } => format!("updated to {}", version),
        CheckOutcome::Failed { stage, version, .. } => {
            format!("update to {} failed to {}", version, stage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Stage;
    use crate::release::Version;
    use crate::runtime::RealRuntime;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_summary() {
        assert_eq!(
            summary(&CheckOutcome::UpToDate(Version::new("1.0"))),
            "up to date at 1.0"
        );
        assert_eq!(
            summary(&CheckOutcome::Failed {
                stage: Stage::Validate,
                version: Version::new("2.0"),
                notified: vec![],
            }),
            "update to 2.0 failed to validate"
        );
    }

    #[tokio::test]
    async fn test_check_unreachable_api_is_ok() {
        let dir = tempdir().unwrap();
        let options = Options {
            api_url: "http://127.0.0.1:1".to_string(),
            pkgbuild: dir.path().join("PKGBUILD"),
            timeout: 2,
            ..Options::default()
        };

        check(RealRuntime, &options).await.unwrap();
        assert!(!dir.path().join(".current_version").exists());
    }

    #[tokio::test]
    async fn test_check_invalid_configuration_is_error() {
        let options = Options {
            repo: "gitbutler".to_string(),
            pkgbuild: PathBuf::from("/nonexistent/PKGBUILD"),
            ..Options::default()
        };
        assert!(check(RealRuntime, &options).await.is_err());
    }
}
