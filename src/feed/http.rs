use super::types::FetchUnavailable;
use super::ListingSource;
use crate::config::SearchConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// Fetches search pages over HTTP. One attempt per call, no retry.
pub struct HttpListingSource {
    client: Client,
}

impl HttpListingSource {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = client_builder(config)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Client settings shared by every search request.
fn client_builder(config: &SearchConfig) -> ClientBuilder {
    Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .user_agent(config.user_agent.as_str())
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchUnavailable> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchUnavailable::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "search page unavailable");
            return Err(FetchUnavailable::Status(status.as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| FetchUnavailable::Transport(e.to_string()))
    }
}
