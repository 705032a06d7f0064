//! Upstream release lookup.
//!
//! A [`ReleaseSource`] answers one question: what is the latest release of
//! the tracked repository? The tag is normalized into a bare [`Version`].

mod github;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use github::{FetchError, GitHubReleases};

/// Repository identifier (owner/repo).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid repository format. Expected 'owner/repo'.")
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// A bare version string, compared by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Wraps an already-normalized version string.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Normalizes a release tag: strips leading `v`s and removes any
    /// `release/` segment (`v1.2.3` -> `1.2.3`, `release/0.14.4` -> `0.14.4`).
    pub fn from_tag(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        let stripped = trimmed.trim_start_matches('v');
        let version = stripped.replace("release/", "");

        if version.is_empty() {
            anyhow::bail!("Release tag '{}' does not contain a version", tag);
        }

        Ok(Self(version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest release of the tracked repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    /// Tag as published upstream (e.g., "release/0.14.4")
    pub tag: String,
    /// Normalized version
    pub version: Version,
    /// Human-facing release page
    pub html_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the latest published release of `repo`.
    async fn latest_release(&self, repo: &RepoId) -> Result<Release>;
}
