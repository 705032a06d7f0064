//! HTTP client shared by the release fetcher, URL probes and webhooks.

mod client;

pub use client::HttpClient;
