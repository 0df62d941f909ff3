// src/ingest/fetcher.rs
use std::time::Duration;

use reqwest::Client;

use crate::error::{MonitorError, Result};
use crate::ingest::feed::{decode_feed, parse_feed, FeedEntry};
use crate::ingest::types::FeedSource;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Some feed hosts reject non-browser agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// HTTP GET + parse for a single feed.
#[derive(Clone)]
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MonitorError::config(format!("building http client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch one feed and return its entries in document order.
    ///
    /// Every failure here is a `MonitorError::Fetch`, scoped to this source.
    pub async fn fetch(&self, source: &FeedSource) -> Result<Vec<FeedEntry>> {
        let url = source.url();
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MonitorError::fetch(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MonitorError::fetch(url, format!("HTTP status {status}")));
        }
        if resp
            .content_length()
            .is_some_and(|len| len as usize > MAX_FEED_SIZE)
        {
            return Err(MonitorError::fetch(url, "response too large"));
        }

        let bytes = resp.bytes().await.map_err(|e| MonitorError::fetch(url, e))?;
        if bytes.len() > MAX_FEED_SIZE {
            return Err(MonitorError::fetch(url, "response too large"));
        }
        tracing::debug!(url, bytes = bytes.len(), "web request completed");

        let body = decode_feed(&bytes);
        parse_feed(&body).map_err(|e| MonitorError::fetch(url, e))
    }
}
