//! `.SRCINFO` derived directly from PKGBUILD text.

use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::pkgbuild::{DownloadUrl, Pkgbuild, compile_regex};
use crate::release::{RepoId, Version};

static PKGDESC: LazyLock<Regex> = LazyLock::new(|| compile_regex(r#"(?m)^pkgdesc="([^"]+)""#));
static ARCH: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"(?m)^arch=\(([^)]*)\)"));

/// Checksum value meaning "integrity check intentionally skipped".
pub const SKIP_CHECKSUM: &str = "SKIP";

const DEFAULT_ARCH: &str = "x86_64";

/// Fields of the `.SRCINFO` that are not present in the PKGBUILD text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcinfoProfile {
    pub url: String,
    pub install: String,
    pub license: String,
    pub depends: Vec<String>,
    pub options: Vec<String>,
}

impl Default for SrcinfoProfile {
    fn default() -> Self {
        Self {
            url: "https://gitbutler.com".to_string(),
            install: "gitbutler-appimage.install".to_string(),
            license: "custom".to_string(),
            depends: vec![
                "zlib".to_string(),
                "hicolor-icon-theme".to_string(),
                "fuse2".to_string(),
            ],
            options: vec!["!strip".to_string()],
        }
    }
}

/// A `.SRCINFO` document for a single-package PKGBUILD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Srcinfo {
    pub pkgname: String,
    pub pkgdesc: String,
    pub pkgver: String,
    pub pkgrel: String,
    pub url: String,
    pub install: String,
    pub arch: Vec<String>,
    pub license: String,
    pub depends: Vec<String>,
    pub options: Vec<String>,
    pub sources: Vec<String>,
}

impl Srcinfo {
    /// Derive the metadata from PKGBUILD text.
    ///
    /// Sources are the rendered download URL and the install script, both
    /// with skipped checksums.
    pub fn derive(
        pkgbuild: &Pkgbuild,
        profile: &SrcinfoProfile,
        repo: &RepoId,
        download_url: &DownloadUrl,
    ) -> Result<Self> {
        let pkgname = pkgbuild.pkgname().context("PKGBUILD has no pkgname")?;
        let pkgver = pkgbuild.pkgver().context("PKGBUILD has no pkgver")?;
        let pkgrel = pkgbuild.pkgrel().context("PKGBUILD has no pkgrel")?;
        let pkgdesc = PKGDESC
            .captures(pkgbuild.as_str())
            .map(|c| c[1].to_string())
            .context("PKGBUILD has no pkgdesc=\"...\"")?;

        let arch = match ARCH.captures(pkgbuild.as_str()) {
            Some(captures) => captures[1]
                .replace(['\'', '"'], "")
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            None => vec![DEFAULT_ARCH.to_string()],
        };

        let source_url = download_url.render(repo, &Version::new(pkgver));

        Ok(Self {
            pkgname: pkgname.to_string(),
            pkgdesc,
            pkgver: pkgver.to_string(),
            pkgrel: pkgrel.to_string(),
            url: profile.url.clone(),
            install: profile.install.clone(),
            arch,
            license: profile.license.clone(),
            depends: profile.depends.clone(),
            options: profile.options.clone(),
            sources: vec![source_url, profile.install.clone()],
        })
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Srcinfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pkgbase = {}", self.pkgname)?;
        writeln!(f, "\tpkgdesc = {}", self.pkgdesc)?;
        writeln!(f, "\tpkgver = {}", self.pkgver)?;
        writeln!(f, "\tpkgrel = {}", self.pkgrel)?;
        writeln!(f, "\turl = {}", self.url)?;
        writeln!(f, "\tinstall = {}", self.install)?;
        for arch in &self.arch {
            writeln!(f, "\tarch = {}", arch)?;
        }
        writeln!(f, "\tlicense = {}", self.license)?;
        for dep in &self.depends {
            writeln!(f, "\tdepends = {}", dep)?;
        }
        for option in &self.options {
            writeln!(f, "\toptions = {}", option)?;
        }
        for source in &self.sources {
            writeln!(f, "\tsource = {}", source)?;
        }
        for _ in &self.sources {
            writeln!(f, "\tsha256sums = {}", SKIP_CHECKSUM)?;
        }
        writeln!(f)?;
        writeln!(f, "pkgname = {}", self.pkgname)
    }
}
