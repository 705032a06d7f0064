//! PKGBUILD parsing and version bumping.
//!
//! A PKGBUILD is kept as raw text. Only `key=value` lines that start at
//! column zero are recognized, and a bump rewrites exactly the first
//! `pkgver` and the first `pkgrel` line. Every other byte is preserved.

mod update;
mod url;

use regex::{NoExpand, Regex};
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::release::Version;

pub use update::PkgbuildUpdater;
pub use url::DownloadUrl;

static PKGVER_LINE: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"(?m)^pkgver=[^\r\n]*"));
static PKGREL_LINE: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"(?m)^pkgrel=[^\r\n]*"));

/// Revision every version bump restarts from.
pub const INITIAL_PKGREL: &str = "1";

pub(crate) fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Patterns are literals; each module's `test_static_regexes_compile` covers them.
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

/// Errors raised while updating a PKGBUILD.
#[derive(Debug)]
pub enum PkgbuildError {
    /// The PKGBUILD file does not exist
    NotFound(PathBuf),
    /// A required `key=value` line is missing
    MissingField(&'static str),
    /// The download URL for the new version did not resolve
    DownloadUrlNotFound(String),
}

impl fmt::Display for PkgbuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PkgbuildError::NotFound(path) => write!(f, "PKGBUILD not found at {:?}", path),
            PkgbuildError::MissingField(key) => {
                write!(f, "PKGBUILD has no '{}=' line", key)
            }
            PkgbuildError::DownloadUrlNotFound(url) => {
                write!(f, "Download URL not found: {}", url)
            }
        }
    }
}

impl std::error::Error for PkgbuildError {}

/// PKGBUILD contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkgbuild {
    content: String,
}

impl Pkgbuild {
    pub fn parse(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Raw value of the first `key=value` line, without trailing `\r`.
    pub fn field(&self, key: &str) -> Option<&str> {
        let prefix = format!("{}=", key);
        self.content
            .lines()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
    }

    pub fn pkgname(&self) -> Option<&str> {
        self.field("pkgname")
    }

    pub fn pkgver(&self) -> Option<&str> {
        self.field("pkgver")
    }

    pub fn pkgrel(&self) -> Option<&str> {
        self.field("pkgrel")
    }

    /// Set `pkgver` to `version` and reset `pkgrel` to 1.
    pub fn bump(&self, version: &Version) -> Result<Pkgbuild, PkgbuildError> {
        if !PKGVER_LINE.is_match(&self.content) {
            return Err(PkgbuildError::MissingField("pkgver"));
        }
        if !PKGREL_LINE.is_match(&self.content) {
            return Err(PkgbuildError::MissingField("pkgrel"));
        }

        let pkgver = format!("pkgver={}", version);
        let pkgrel = format!("pkgrel={}", INITIAL_PKGREL);

        let content = PKGVER_LINE.replacen(&self.content, 1, NoExpand(&pkgver));
        let content = PKGREL_LINE.replacen(&content, 1, NoExpand(&pkgrel));

        Ok(Pkgbuild::parse(content.into_owned()))
    }
}

impl fmt::Display for Pkgbuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKGBUILD: &str = r#"# Maintainer: Someone <someone@example.com>
pkgname=foo
pkgver=1.0.0
pkgrel=3
pkgdesc="A foo tool"
arch=('x86_64')
source=("https://example.com/foo-${pkgver}.tar.gz")

package() {
    install -Dm755 foo "$pkgdir/usr/bin/foo"
}
"#;

    #[test]
    fn test_static_regexes_compile() {
        assert!(PKGVER_LINE.is_match("pkgver=1"));
        assert!(PKGREL_LINE.is_match("pkgrel=1"));
    }

    #[test]
    fn test_fields() {
        let pkgbuild = Pkgbuild::parse(PKGBUILD);
        assert_eq!(pkgbuild.pkgname(), Some("foo"));
        assert_eq!(pkgbuild.pkgver(), Some("1.0.0"));
        assert_eq!(pkgbuild.pkgrel(), Some("3"));
        assert_eq!(pkgbuild.field("pkgdesc"), Some(r#""A foo tool""#));
        assert_eq!(pkgbuild.field("depends"), None);
    }

    #[test]
    fn test_bump_rewrites_only_version_lines() {
        let pkgbuild = Pkgbuild::parse(PKGBUILD);
        let bumped = pkgbuild.bump(&Version::new("1.2.0")).unwrap();

        assert_eq!(bumped.pkgver(), Some("1.2.0"));
        assert_eq!(bumped.pkgrel(), Some("1"));

        let before: Vec<&str> = PKGBUILD.lines().collect();
        let after: Vec<&str> = bumped.as_str().lines().collect();
        assert_eq!(before.len(), after.len());
        for (old, new) in before.iter().zip(after.iter()) {
            if old.starts_with("pkgver=") {
                assert_eq!(*new, "pkgver=1.2.0");
            } else if old.starts_with("pkgrel=") {
                assert_eq!(*new, "pkgrel=1");
            } else {
                assert_eq!(old, new);
            }
        }
        assert!(bumped.as_str().ends_with("}\n"));
    }

    #[test]
    fn test_bump_preserves_crlf_and_missing_trailing_newline() {
        let pkgbuild = Pkgbuild::parse("pkgname=foo\r\npkgver=1.0.0\r\npkgrel=3");
        let bumped = pkgbuild.bump(&Version::new("2.0.0")).unwrap();
        assert_eq!(bumped.as_str(), "pkgname=foo\r\npkgver=2.0.0\r\npkgrel=1");
    }

    #[test]
    fn test_bump_rewrites_only_first_occurrence() {
        let pkgbuild = Pkgbuild::parse("pkgver=1\npkgrel=2\npkgver=old\npkgrel=9\n");
        let bumped = pkgbuild.bump(&Version::new("3")).unwrap();
        assert_eq!(bumped.as_str(), "pkgver=3\npkgrel=1\npkgver=old\npkgrel=9\n");
    }

    #[test]
    fn test_bump_ignores_indented_lines() {
        let pkgbuild = Pkgbuild::parse("  pkgver=0.1\npkgver=1.0\npkgrel=2\n");
        let bumped = pkgbuild.bump(&Version::new("1.1")).unwrap();
        assert_eq!(bumped.as_str(), "  pkgver=0.1\npkgver=1.1\npkgrel=1\n");
    }

    #[test]
    fn test_bump_treats_version_as_literal() {
        let pkgbuild = Pkgbuild::parse("pkgver=1\npkgrel=2\n");
        let bumped = pkgbuild.bump(&Version::new("$1.0")).unwrap();
        assert_eq!(bumped.pkgver(), Some("$1.0"));
    }

    #[test]
    fn test_bump_missing_fields() {
        let no_ver = Pkgbuild::parse("pkgname=foo\npkgrel=1\n");
        assert!(matches!(
            no_ver.bump(&Version::new("1")),
            Err(PkgbuildError::MissingField("pkgver"))
        ));

        let no_rel = Pkgbuild::parse("pkgname=foo\npkgver=1\n");
        assert!(matches!(
            no_rel.bump(&Version::new("1")),
            Err(PkgbuildError::MissingField("pkgrel"))
        ));
    }
}
