use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    application::CheckSettings,
    http::HttpClient,
    notify::NotifyConfig,
    pkgbuild::DownloadUrl,
    release::{GitHubReleases, RepoId},
    runtime::Runtime,
    srcinfo::{SrcinfoProfile, SrcinfoStrategy},
};

pub const DEFAULT_REPO: &str = "gitbutlerapp/gitbutler";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://github.com/{owner}/{repo}/releases/download/release/{version}/GitButler_{version}_amd64.AppImage";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "aurbump";

/// Options shared by every subcommand. Each one can also be set from the environment.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Upstream GitHub repository
    #[arg(long, env = "AURBUMP_REPO", value_name = "OWNER/REPO", default_value = DEFAULT_REPO, global = true)]
    pub repo: String,

    /// GitHub API URL
    #[arg(long = "api-url", env = "AURBUMP_API_URL", value_name = "URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// PKGBUILD to update
    #[arg(long, env = "AURBUMP_PKGBUILD", value_name = "PATH", default_value = "PKGBUILD", global = true)]
    pub pkgbuild: PathBuf,

    /// .SRCINFO to write (defaults to .SRCINFO next to the PKGBUILD)
    #[arg(long, env = "AURBUMP_SRCINFO", value_name = "PATH", global = true)]
    pub srcinfo: Option<PathBuf>,

    /// Version marker file (defaults to .current_version next to the PKGBUILD)
    #[arg(long = "version-file", env = "AURBUMP_VERSION_FILE", value_name = "PATH", global = true)]
    pub version_file: Option<PathBuf>,

    /// Download URL template; placeholders: {version}, {build}, {owner}, {repo}
    #[arg(long = "download-url", env = "AURBUMP_DOWNLOAD_URL", value_name = "TEMPLATE", default_value = DEFAULT_DOWNLOAD_URL, global = true)]
    pub download_url: String,

    /// Upstream build number substituted for {build}
    #[arg(long = "build-number", env = "AURBUMP_BUILD_NUMBER", value_name = "N", global = true)]
    pub build_number: Option<String>,

    /// Do not verify that the download URL resolves before updating
    #[arg(long = "skip-url-check", env = "AURBUMP_SKIP_URL_CHECK", global = true)]
    pub skip_url_check: bool,

    /// How .SRCINFO is produced
    #[arg(long = "srcinfo-strategy", env = "AURBUMP_SRCINFO_STRATEGY", value_enum, default_value_t = SrcinfoStrategy::Extract, global = true)]
    pub srcinfo_strategy: SrcinfoStrategy,

    /// Network timeout in seconds
    #[arg(long, env = "AURBUMP_TIMEOUT", value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            pkgbuild: PathBuf::from("PKGBUILD"),
            srcinfo: None,
            version_file: None,
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            build_number: None,
            skip_url_check: false,
            srcinfo_strategy: SrcinfoStrategy::Extract,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

pub struct Config<R: Runtime> {
    pub runtime: R,
    /// Anonymous client for webhooks and download URL checks
    pub http_client: HttpClient,
    /// Release source; its client is the only one sending `GITHUB_TOKEN`
    pub source: GitHubReleases,
    pub settings: CheckSettings,
    pub notify: NotifyConfig,
    pub timeout: Duration,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, options: &Options) -> Result<Self> {
        let repo: RepoId = options.repo.parse()?;
        let download_url = DownloadUrl::new(&options.download_url, options.build_number.clone())?;
        let timeout = Duration::from_secs(options.timeout);

        // Only the GitHub API client carries the token; webhooks and download
        // hosts get an anonymous client.
        let mut headers = HeaderMap::new();
        let token = runtime.env_var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        if let Some(token) = &token {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("GITHUB_TOKEN is not a valid header value")?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using GITHUB_TOKEN for authentication: {}", mask(token));
        }

        let github_client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        let source = GitHubReleases::new(
            HttpClient::new(github_client),
            &options.api_url,
            token.is_some(),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        let http_client = HttpClient::new(client);

        let settings = CheckSettings {
            repo,
            srcinfo_path: sibling_or(&options.pkgbuild, options.srcinfo.as_ref(), ".SRCINFO"),
            version_file: sibling_or(
                &options.pkgbuild,
                options.version_file.as_ref(),
                ".current_version",
            ),
            pkgbuild_path: options.pkgbuild.clone(),
            download_url,
            verify_url: !options.skip_url_check,
            strategy: options.srcinfo_strategy,
            profile: SrcinfoProfile::default(),
        };
        debug!("Resolved settings: {:?}", settings);

        let notify = NotifyConfig::from_runtime(&runtime);

        Ok(Self {
            runtime,
            http_client,
            source,
            settings,
            notify,
            timeout,
        })
    }
}

fn sibling_or(pkgbuild: &Path, explicit: Option<&PathBuf>, name: &str) -> PathBuf {
    match explicit {
        Some(path) => path.clone(),
        None => pkgbuild.with_file_name(name),
    }
}

fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
