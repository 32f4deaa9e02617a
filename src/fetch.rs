//! Remote Fetch Module
//!
//! Fetches raw bytes from remote URLs. A 404 is reported as absent content
//! rather than an error; any other non-success status is an upstream failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{AppError, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Source of remote bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url`. Returns `Ok(None)` when the remote answers 404.
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>>;
}

/// [`Fetcher`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(%status, url, "fetched remote resource");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(describe_failure(status, &body)));
        }

        Ok(Some(response.bytes().await?.to_vec()))
    }
}

/// Formats a failed response, preferring the JSON `error.message` of Google APIs.
fn describe_failure(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_owned));

    match message {
        Some(message) => format!("{status}: {message}"),
        None => format!("non-success response: {status}"),
    }
}
