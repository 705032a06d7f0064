//! Download URL template for the packaged artifact.

use anyhow::Result;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::release::{RepoId, Version};

use super::compile_regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"\{([A-Za-z_]+)\}"));

const PLACEHOLDERS: &[&str] = &["version", "build", "owner", "repo"];

/// URL template with `{version}`, `{build}`, `{owner}` and `{repo}` placeholders.
///
/// The upstream build number is not derivable from the release tag, so it
/// is supplied as configuration. A template that needs `{build}` is rejected
/// when no build number is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadUrl {
    template: String,
    build_number: Option<String>,
}

impl DownloadUrl {
    pub fn new(template: impl Into<String>, build_number: Option<String>) -> Result<Self> {
        let template = template.into();

        for captures in PLACEHOLDER.captures_iter(&template) {
            let name = &captures[1];
            if !PLACEHOLDERS.contains(&name) {
                anyhow::bail!(
                    "Unknown placeholder '{{{}}}' in download URL template. Expected one of: {}",
                    name,
                    PLACEHOLDERS.join(", ")
                );
            }
            if name == "build" && build_number.is_none() {
                anyhow::bail!(
                    "Download URL template uses {{build}} but no build number is configured (--build-number)"
                );
            }
        }

        Ok(Self {
            template,
            build_number,
        })
    }

    /// Substitutes every placeholder in one pass; substituted values are
    /// never expanded again.
    pub fn render(&self, repo: &RepoId, version: &Version) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| match &caps[1] {
                "version" => version.as_str().to_string(),
                "build" => self.build_number.clone().unwrap_or_default(),
                "owner" => repo.owner.clone(),
                "repo" => repo.repo.clone(),
                other => format!("{{{}}}", other),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoId {
        "gitbutlerapp/gitbutler".parse().unwrap()
    }

    #[test]
    fn test_render_all_placeholders() {
        let url = DownloadUrl::new(
            "https://releases.example.com/{owner}/{repo}/{version}-{build}/app_{version}.tar.gz",
            Some("2433".to_string()),
        )
        .unwrap();

        assert_eq!(
            url.render(&repo(), &Version::new("0.14.4")),
            "https://releases.example.com/gitbutlerapp/gitbutler/0.14.4-2433/app_0.14.4.tar.gz"
        );
    }

    #[test]
    fn test_build_placeholder_requires_build_number() {
        let result = DownloadUrl::new("https://example.com/{version}-{build}", None);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("--build-number"));
    }

    #[test]
    fn test_build_number_is_optional_without_placeholder() {
        let url = DownloadUrl::new("https://example.com/{version}.tar.gz", None).unwrap();
        assert_eq!(
            url.render(&repo(), &Version::new("1.0")),
            "https://example.com/1.0.tar.gz"
        );
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let result = DownloadUrl::new("https://example.com/{tag}.tar.gz", None);
        assert!(result.unwrap_err().to_string().contains("{tag}"));
    }

    #[test]
    fn test_substituted_values_are_not_expanded_again() {
        let url = DownloadUrl::new("https://example.com/{repo}/{version}", None).unwrap();
        assert_eq!(
            url.render(&repo(), &Version::new("1.0-{repo}")),
            "https://example.com/gitbutler/1.0-{repo}"
        );
    }
}
