use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;

use crate::http::HttpClient;
use crate::release::{RepoId, Version};
use crate::runtime::{Runtime, write_atomic};

use super::{DownloadUrl, Pkgbuild, PkgbuildError};

/// Rewrites the PKGBUILD for a new upstream version.
pub struct PkgbuildUpdater<'a, R: Runtime> {
    runtime: &'a R,
    http_client: &'a HttpClient,
    repo: &'a RepoId,
    download_url: &'a DownloadUrl,
    verify_url: bool,
}

impl<'a, R: Runtime> PkgbuildUpdater<'a, R> {
    pub fn new(
        runtime: &'a R,
        http_client: &'a HttpClient,
        repo: &'a RepoId,
        download_url: &'a DownloadUrl,
        verify_url: bool,
    ) -> Self {
        Self {
            runtime,
            http_client,
            repo,
            download_url,
            verify_url,
        }
    }

    /// Bump `pkgver`/`pkgrel` in the file at `path`.
    ///
    /// The new content is prepared in memory and, when URL verification is
    /// on, the download URL for `version` must resolve before anything is
    /// written. The file is replaced atomically.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, path: &Path, version: &Version) -> Result<Pkgbuild> {
        if !self.runtime.exists(path) {
            return Err(PkgbuildError::NotFound(path.to_path_buf()).into());
        }

        let content = self
            .runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let current = Pkgbuild::parse(content);
        debug!(
            "Current PKGBUILD: pkgver={:?} pkgrel={:?}",
            current.pkgver(),
            current.pkgrel()
        );

        let updated = current.bump(version)?;

        if self.verify_url {
            let url = self.download_url.render(self.repo, version);
            info!("Verifying download URL {}", url);
            if !self.http_client.url_exists(&url).await {
                warn!("Download URL not found: {}", url);
                return Err(PkgbuildError::DownloadUrlNotFound(url).into());
            }
        }

        write_atomic(self.runtime, path, updated.as_str().as_bytes())?;
        info!("Updated {:?} to pkgver={} pkgrel=1", path, version);

        Ok(updated)
    }
}
