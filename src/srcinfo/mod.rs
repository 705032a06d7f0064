//! `.SRCINFO` generation and validation.
//!
//! Two strategies are available and chosen by configuration:
//!
//! - [`SrcinfoStrategy::Extract`] re-derives the fields from the PKGBUILD
//!   text with regexes and a fixed [`SrcinfoProfile`]. Needs no Arch tooling.
//! - [`SrcinfoStrategy::Makepkg`] delegates to `makepkg --printsrcinfo`.
//!
//! Validation is a presence check of both files. It does not parse or
//! build anything.

mod extract;
mod makepkg;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::fmt;
use std::path::Path;

use crate::pkgbuild::{DownloadUrl, Pkgbuild};
use crate::release::RepoId;
use crate::runtime::{Runtime, write_atomic};

pub use extract::{SKIP_CHECKSUM, Srcinfo, SrcinfoProfile};
pub use makepkg::printsrcinfo_command;

/// How the `.SRCINFO` is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SrcinfoStrategy {
    /// Derive fields from the PKGBUILD text
    #[default]
    Extract,
    /// Run `makepkg --printsrcinfo`
    Makepkg,
}

impl fmt::Display for SrcinfoStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SrcinfoStrategy::Extract => write!(f, "extract"),
            SrcinfoStrategy::Makepkg => write!(f, "makepkg"),
        }
    }
}

/// Regenerates the `.SRCINFO` next to a PKGBUILD.
pub struct SrcinfoGenerator<'a, R: Runtime> {
    runtime: &'a R,
    strategy: SrcinfoStrategy,
    profile: &'a SrcinfoProfile,
    repo: &'a RepoId,
    download_url: &'a DownloadUrl,
}

impl<'a, R: Runtime> SrcinfoGenerator<'a, R> {
    pub fn new(
        runtime: &'a R,
        strategy: SrcinfoStrategy,
        profile: &'a SrcinfoProfile,
        repo: &'a RepoId,
        download_url: &'a DownloadUrl,
    ) -> Self {
        Self {
            runtime,
            strategy,
            profile,
            repo,
            download_url,
        }
    }

    /// Write `.SRCINFO` for the PKGBUILD at `pkgbuild_path`.
    /// Errors are logged and reported as `false`.
    pub async fn generate(&self, pkgbuild_path: &Path, srcinfo_path: &Path) -> bool {
        match self.try_generate(pkgbuild_path, srcinfo_path).await {
            Ok(()) => {
                info!("Generated {:?} ({})", srcinfo_path, self.strategy);
                true
            }
            Err(e) => {
                error!("Failed to generate .SRCINFO: {:#}", e);
                false
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn try_generate(&self, pkgbuild_path: &Path, srcinfo_path: &Path) -> Result<()> {
        let content = match self.strategy {
            SrcinfoStrategy::Extract => {
                let text = self
                    .runtime
                    .read_to_string(pkgbuild_path)
                    .with_context(|| format!("Failed to read {:?}", pkgbuild_path))?;
                let pkgbuild = Pkgbuild::parse(text);
                Srcinfo::derive(&pkgbuild, self.profile, self.repo, self.download_url)?.render()
            }
            SrcinfoStrategy::Makepkg => makepkg::printsrcinfo(self.runtime, pkgbuild_path).await?,
        };

        debug!("Writing {} bytes to {:?}", content.len(), srcinfo_path);
        write_atomic(self.runtime, srcinfo_path, content.as_bytes())
    }
}

/// Presence check of the PKGBUILD and `.SRCINFO`.
///
/// This is intentionally weak: the files are not parsed and nothing is
/// built, so a malformed but present file passes.
#[tracing::instrument(skip(runtime))]
pub fn validate<R: Runtime>(runtime: &R, pkgbuild_path: &Path, srcinfo_path: &Path) -> bool {
    let mut ok = true;
    for path in [pkgbuild_path, srcinfo_path] {
        if !runtime.exists(path) {
            warn!("Missing {:?}", path);
            ok = false;
        }
    }

    if ok {
        info!("PKGBUILD and .SRCINFO present");
    }
    ok
}
