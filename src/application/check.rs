//! Check action - one end-to-end update cycle.
//!
//! ```text
//! CHECK -> (unchanged: stop)
//!       -> UPDATE_PKGBUILD -> GENERATE_SRCINFO -> VALIDATE -> PERSIST_VERSION -> NOTIFY_SUCCESS
//! any failing step -> NOTIFY_ERROR -> stop
//! ```
//!
//! The version marker is written only after every earlier step succeeded,
//! so a failed cycle is retried on the next run. Nothing is rolled back: a
//! PKGBUILD bumped before a later failure stays bumped.

use log::{info, warn};
use std::fmt;
use std::path::PathBuf;

use crate::http::HttpClient;
use crate::notify::{Notification, Notifier};
use crate::pkgbuild::{DownloadUrl, PkgbuildUpdater};
use crate::release::{Release, ReleaseSource, RepoId, Version};
use crate::runtime::Runtime;
use crate::srcinfo::{self, SrcinfoGenerator, SrcinfoProfile, SrcinfoStrategy};
use crate::store::VersionStore;

/// Resolved settings for a check run.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub repo: RepoId,
    pub pkgbuild_path: PathBuf,
    pub srcinfo_path: PathBuf,
    pub version_file: PathBuf,
    pub download_url: DownloadUrl,
    pub verify_url: bool,
    pub strategy: SrcinfoStrategy,
    pub profile: SrcinfoProfile,
}

/// Step of the cycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadVersion,
    UpdatePkgbuild,
    GenerateSrcinfo,
    Validate,
    PersistVersion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ReadVersion => write!(f, "read version marker"),
            Stage::UpdatePkgbuild => write!(f, "update PKGBUILD"),
            Stage::GenerateSrcinfo => write!(f, "generate .SRCINFO"),
            Stage::Validate => write!(f, "validate"),
            Stage::PersistVersion => write!(f, "save version marker"),
        }
    }
}

/// How a check run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The latest release could not be determined; nothing was touched
    FetchFailed,
    /// Upstream matches the stored version
    UpToDate(Version),
    /// Files updated and marker persisted
    Updated {
        version: Version,
        notified: Vec<&'static str>,
    },
    /// A step failed; the marker was not written
    Failed {
        stage: Stage,
        version: Version,
        notified: Vec<&'static str>,
    },
}

/// Runs one update cycle.
pub struct CheckAction<'a, R: Runtime> {
    runtime: &'a R,
    source: &'a dyn ReleaseSource,
    http_client: &'a HttpClient,
    notifier: &'a Notifier<'a>,
    settings: &'a CheckSettings,
}

impl<'a, R: Runtime> CheckAction<'a, R> {
    pub fn new(
        runtime: &'a R,
        source: &'a dyn ReleaseSource,
        http_client: &'a HttpClient,
        notifier: &'a Notifier<'a>,
        settings: &'a CheckSettings,
    ) -> Self {
        Self {
            runtime,
            source,
            http_client,
            notifier,
            settings,
        }
    }

    fn package(&self) -> &str {
        &self.settings.repo.repo
    }

    #[tracing::instrument(skip(self), fields(repo = %self.settings.repo))]
    pub async fn run(&self) -> CheckOutcome {
        let settings = self.settings;
        info!("Checking {} for new releases...", settings.repo);

        let release = match self.source.latest_release(&settings.repo).await {
            Ok(release) => release,
            Err(e) => {
                warn!("Could not determine the latest version: {:#}", e);
                return CheckOutcome::FetchFailed;
            }
        };
        let version = release.version.clone();

        let store = VersionStore::new(self.runtime, &settings.version_file);
        let current = match store.read() {
            Ok(current) => current,
            Err(e) => {
                return self
                    .fail(Stage::ReadVersion, &version, format!("{:#}", e))
                    .await;
            }
        };

        if current.as_ref() == Some(&version) {
            info!("Already at the latest version: {}", version);
            return CheckOutcome::UpToDate(version);
        }

        info!("New version found: {}", version);
        info!(
            "Current version: {}",
            current
                .as_ref()
                .map(Version::as_str)
                .unwrap_or("unknown")
        );

        let updater = PkgbuildUpdater::new(
            self.runtime,
            self.http_client,
            &settings.repo,
            &settings.download_url,
            settings.verify_url,
        );
        if let Err(e) = updater.update(&settings.pkgbuild_path, &version).await {
            return self
                .fail(
                    Stage::UpdatePkgbuild,
                    &version,
                    format!("Failed to update PKGBUILD for version {}: {:#}", version, e),
                )
                .await;
        }

        let generator = SrcinfoGenerator::new(
            self.runtime,
            settings.strategy,
            &settings.profile,
            &settings.repo,
            &settings.download_url,
        );
        if !generator
            .generate(&settings.pkgbuild_path, &settings.srcinfo_path)
            .await
        {
            return self
                .fail(
                    Stage::GenerateSrcinfo,
                    &version,
                    format!("Failed to generate .SRCINFO for version {}", version),
                )
                .await;
        }

        info!("Validating files...");
        if !srcinfo::validate(self.runtime, &settings.pkgbuild_path, &settings.srcinfo_path) {
            return self
                .fail(
                    Stage::Validate,
                    &version,
                    format!("Validation failed for version {}", version),
                )
                .await;
        }

        if let Err(e) = store.write(&version) {
            return self
                .fail(
                    Stage::PersistVersion,
                    &version,
                    format!("Failed to save version {}: {:#}", version, e),
                )
                .await;
        }

        let notified = self
            .notifier
            .notify(&Notification::updated(
                self.package(),
                &version,
                &release.html_url,
            ))
            .await;

        self.log_next_steps(&release);
        CheckOutcome::Updated { version, notified }
    }

    async fn fail(&self, stage: Stage, version: &Version, message: String) -> CheckOutcome {
        warn!("Failed to {}: {}", stage, message);
        let notified = self
            .notifier
            .notify(&Notification::error(self.package(), &message))
            .await;

        CheckOutcome::Failed {
            stage,
            version: version.clone(),
            notified,
        }
    }

    fn log_next_steps(&self, release: &Release) {
        info!("Files updated. Commit and push to the AUR:");
        info!(
            "  git add {} {}",
            file_name(&self.settings.pkgbuild_path),
            file_name(&self.settings.srcinfo_path)
        );
        info!("  git commit -m 'Update to v{}'", release.version);
        info!("  git push");
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
