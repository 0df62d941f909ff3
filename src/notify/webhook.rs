// src/notify/webhook.rs
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::error::{MonitorError, Result};

pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// POST `payload` as JSON. 200 and 204 are success; any other status becomes
/// a delivery error carrying the response body, which is where providers put
/// their human-readable reason.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    payload: &T,
) -> Result<()> {
    let rsp = client
        .post(url)
        .timeout(WEBHOOK_TIMEOUT)
        .json(payload)
        .send()
        .await
        // reqwest errors print the request URL, which holds the webhook token
        .map_err(|e| MonitorError::Delivery(format!("webhook request failed: {}", e.without_url())))?;

    let status = rsp.status();
    if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
        return Ok(());
    }

    let body = rsp
        .text()
        .await
        .map_err(|e| {
            MonitorError::Delivery(format!(
                "webhook HTTP {status}, unreadable body: {}",
                e.without_url()
            ))
        })?;
    Err(MonitorError::Delivery(format!(
        "webhook HTTP {}: {}",
        status.as_u16(),
        body
    )))
}

/// Webhook URLs embed their secret token; keep only scheme and host for logs.
pub(crate) fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => format!("{}://{}/…", u.scheme(), u.host_str().unwrap_or_default()),
        Err(_) => "<invalid url>".to_string(),
    }
}
