//! Persisted marker of the last version processed end-to-end.

use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::release::Version;
use crate::runtime::{Runtime, write_atomic};

/// Single-line text file holding the last processed version.
pub struct VersionStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> VersionStore<'a, R> {
    pub fn new(runtime: &'a R, path: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            path: path.into(),
        }
    }

    /// Read the stored version. A missing or blank file means "unknown".
    #[tracing::instrument(skip(self))]
    pub fn read(&self) -> Result<Option<Version>> {
        if !self.runtime.exists(&self.path) {
            debug!("No version marker at {:?}", self.path);
            return Ok(None);
        }

        let content = self
            .runtime
            .read_to_string(&self.path)
            .with_context(|| format!("Failed to read version marker {:?}", self.path))?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(Version::new(trimmed)))
    }

    /// Overwrite the stored version.
    #[tracing::instrument(skip(self))]
    pub fn write(&self, version: &Version) -> Result<()> {
        write_atomic(self.runtime, &self.path, version.as_str().as_bytes())
            .with_context(|| format!("Failed to write version marker {:?}", self.path))
    }
}
