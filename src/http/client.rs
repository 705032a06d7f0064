//! Thin wrapper over `reqwest::Client` for single, unretried requests.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Response};
use serde::Serialize;

/// HTTP client shared by every network-facing component of a run.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a single GET request. The response is returned whatever its
    /// status; callers decide what a non-2xx means.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        debug!("GET {} -> {}", url, response.status());
        Ok(response)
    }

    /// Checks that a URL resolves with a HEAD request (redirects followed).
    /// Any transport error or non-2xx status means the URL does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn url_exists(&self, url: &str) -> bool {
        debug!("HEAD {}...", url);

        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("HEAD {} -> {}", url, status);
                status.is_success()
            }
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }

    /// POSTs a JSON body and fails unless the response status is 2xx.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("POST {} -> {}", url, status);
        if !status.is_success() {
            anyhow::bail!("Unexpected HTTP status {}", status);
        }

        Ok(())
    }
}
