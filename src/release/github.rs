//! GitHub release source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{StatusCode, header::HeaderMap};
use std::fmt;

use crate::http::HttpClient;

use super::{Release, ReleaseSource, RepoId, Version};

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub tag_name: String,
        pub html_url: String,
    }
}

/// Why the latest release could not be fetched.
#[derive(Debug, PartialEq, Eq)]
pub enum FetchError {
    /// 404: the repository is missing or has never published a release
    NoRelease(RepoId),
    /// 401: the token was rejected
    Unauthorized,
    /// 429, or 403 with an exhausted rate limit
    RateLimited { authenticated: bool },
    /// 403 for any other reason
    Forbidden,
    /// Any other non-2xx status
    Status(StatusCode),
}

impl FetchError {
    fn classify(
        repo: &RepoId,
        status: StatusCode,
        headers: &HeaderMap,
        authenticated: bool,
    ) -> Self {
        let limit_exhausted = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");

        match status {
            StatusCode::NOT_FOUND => FetchError::NoRelease(repo.clone()),
            StatusCode::UNAUTHORIZED => FetchError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited { authenticated },
            StatusCode::FORBIDDEN if limit_exhausted => FetchError::RateLimited { authenticated },
            StatusCode::FORBIDDEN => FetchError::Forbidden,
            other => FetchError::Status(other),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NoRelease(repo) => {
                write!(f, "{} has no published release (or does not exist)", repo)
            }
            FetchError::Unauthorized => {
                write!(f, "GitHub rejected GITHUB_TOKEN (HTTP 401); check that it is valid")
            }
            FetchError::RateLimited {
                authenticated: false,
            } => write!(
                f,
                "GitHub API rate limit exceeded; set GITHUB_TOKEN to raise the limit"
            ),
            FetchError::RateLimited {
                authenticated: true,
            } => write!(f, "GitHub API rate limit exceeded for GITHUB_TOKEN"),
            FetchError::Forbidden => write!(
                f,
                "GitHub refused access (HTTP 403); GITHUB_TOKEN may lack permission"
            ),
            FetchError::Status(status) => write!(f, "GitHub API returned HTTP {}", status),
        }
    }
}

impl std::error::Error for FetchError {}

/// Fetches the latest release from a GitHub-compatible API.
pub struct GitHubReleases {
    http_client: HttpClient,
    api_url: String,
    authenticated: bool,
}

impl GitHubReleases {
    /// `authenticated` only tunes error messages; the token itself lives in
    /// the client's default headers.
    pub fn new(http_client: HttpClient, api_url: &str, authenticated: bool) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            authenticated,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleases {
    async fn latest_release(&self, repo: &RepoId) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, repo.owner, repo.repo
        );
        debug!("Fetching latest release from {}...", url);

        let response = self
            .http_client
            .get(&url)
            .await
            .with_context(|| format!("Failed to fetch latest release of {}", repo))?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                FetchError::classify(repo, status, response.headers(), self.authenticated).into(),
            );
        }

        let release: api::Release = response
            .json()
            .await
            .with_context(|| format!("Invalid release response for {}", repo))?;

        release.try_into()
    }
}

impl TryFrom<api::Release> for Release {
    type Error = anyhow::Error;

    fn try_from(r: api::Release) -> Result<Self> {
        Ok(Release {
            version: Version::from_tag(&r.tag_name)?,
            tag: r.tag_name,
            html_url: r.html_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    fn repo() -> RepoId {
        "owner/repo".parse().unwrap()
    }

    async fn fetch_with_status(
        status: usize,
        headers: &[(&'static str, &'static str)],
        authenticated: bool,
    ) -> anyhow::Error {
        let mut server = mockito::Server::new_async().await;
        let mut mock = server
            .mock("GET", "/repos/owner/repo/releases/latest")
            .with_status(status);
        for (name, value) in headers {
            mock = mock.with_header(*name, *value);
        }
        let _mock = mock.create_async().await;

        let source = GitHubReleases::new(
            HttpClient::new(Client::new()),
            &server.url(),
            authenticated,
        );
        source.latest_release(&repo()).await.unwrap_err()
    }

    #[test]
    fn test_api_url_trailing_slash() {
        let source = GitHubReleases::new(
            HttpClient::new(Client::new()),
            "https://custom.api/",
            false,
        );
        assert_eq!(source.api_url(), "https://custom.api");
    }

    #[tokio::test]
    async fn test_latest_release() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "tag_name": "release/0.14.4",
                    "html_url": "https://github.com/owner/repo/releases/tag/release/0.14.4",
                    "prerelease": false
                }"#,
            )
            .create_async()
            .await;

        let source = GitHubReleases::new(HttpClient::new(Client::new()), &server.url(), false);
        let release = source.latest_release(&repo()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(release.tag, "release/0.14.4");
        assert_eq!(release.version, Version::new("0.14.4"));
        assert_eq!(
            release.html_url,
            "https://github.com/owner/repo/releases/tag/release/0.14.4"
        );
    }

    #[tokio::test]
    async fn test_latest_release_missing_fields() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/repos/owner/repo/releases/latest")
            .with_status(200)
            .with_body(r#"{"name": "no tag here"}"#)
            .create_async()
            .await;

        let source = GitHubReleases::new(HttpClient::new(Client::new()), &server.url(), false);
        let err = source.latest_release(&repo()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid release response for owner/repo"));
    }

    #[tokio::test]
    async fn test_no_published_release() {
        let err = fetch_with_status(404, &[], false).await;

        assert_eq!(
            err.downcast_ref::<FetchError>(),
            Some(&FetchError::NoRelease(repo()))
        );
        assert_eq!(
            err.to_string(),
            "owner/repo has no published release (or does not exist)"
        );
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let err = fetch_with_status(401, &[], true).await;
        assert_eq!(err.downcast_ref::<FetchError>(), Some(&FetchError::Unauthorized));
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn test_anonymous_rate_limit_suggests_token() {
        let err = fetch_with_status(403, &[("x-ratelimit-remaining", "0")], false).await;
        assert_eq!(
            err.downcast_ref::<FetchError>(),
            Some(&FetchError::RateLimited {
                authenticated: false
            })
        );
        assert!(err.to_string().contains("set GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn test_too_many_requests_with_token() {
        let err = fetch_with_status(429, &[], true).await;
        assert_eq!(
            err.to_string(),
            "GitHub API rate limit exceeded for GITHUB_TOKEN"
        );
    }

    #[tokio::test]
    async fn test_forbidden_with_remaining_quota() {
        let err = fetch_with_status(403, &[("x-ratelimit-remaining", "42")], true).await;
        assert_eq!(err.downcast_ref::<FetchError>(), Some(&FetchError::Forbidden));
    }

    #[tokio::test]
    async fn test_server_error() {
        let err = fetch_with_status(502, &[], false).await;
        assert_eq!(
            err.downcast_ref::<FetchError>(),
            Some(&FetchError::Status(StatusCode::BAD_GATEWAY))
        );
    }
}
