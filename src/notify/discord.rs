// src/notify/discord.rs
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;

use super::webhook::{post_json, redact};
use super::Notifier;
use crate::error::{MonitorError, Result};

static DISCORD_WEBHOOK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://discord\.com/api/webhooks/[0-9]+/[0-9A-Za-z_-]+(\?.*)?$").unwrap()
});

#[derive(Clone)]
pub struct DiscordWebhook {
    webhook: String,
    client: Client,
}

#[derive(Serialize)]
struct DiscordMessage<'a> {
    content: &'a str,
}

impl DiscordWebhook {
    /// Validates the URL shape; no request is made.
    pub fn new(webhook: &str) -> Result<Self> {
        if webhook.is_empty() {
            return Err(MonitorError::Validation("Discord webhook is empty".into()));
        }
        if !Self::is_valid_url(webhook) {
            return Err(MonitorError::Validation(format!(
                "invalid Discord webhook: {}",
                redact(webhook)
            )));
        }
        Ok(Self::unchecked(webhook))
    }

    pub fn is_valid_url(url: &str) -> bool {
        DISCORD_WEBHOOK_RE.is_match(url)
    }

    fn unchecked(webhook: &str) -> Self {
        Self {
            webhook: webhook.to_string(),
            client: Client::new(),
        }
    }
}

impl std::fmt::Debug for DiscordWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordWebhook")
            .field("webhook", &redact(&self.webhook))
            .finish()
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn send(&self, message: &str) -> Result<()> {
        post_json(&self.client, &self.webhook, &DiscordMessage { content: message }).await
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn accepts_numeric_id_and_token() {
        assert!(DiscordWebhook::new("https://discord.com/api/webhooks/123/abcDEF-_").is_ok());
        assert!(DiscordWebhook::new("https://discord.com/api/webhooks/123/abc?wait=true").is_ok());
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in [
            "",
            "https://discord.com/api/webhooks/abc/xyz",
            "http://discord.com/api/webhooks/123/abc",
            "https://evil.test/?https://discord.com/api/webhooks/123/abc",
            "https://hooks.slack.com/services/T000/B000/XXXXXXXXXXXXXXXXXXXXXXXX",
        ] {
            let err = DiscordWebhook::new(bad).unwrap_err();
            assert!(matches!(err, MonitorError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn debug_hides_token() {
        let w = DiscordWebhook::new("https://discord.com/api/webhooks/123/supersecret").unwrap();
        assert!(!format!("{w:?}").contains("supersecret"));
    }

    #[tokio::test]
    async fn posts_content_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "content": "hello" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let w = DiscordWebhook::unchecked(&server.uri());
        w.send("hello").await.unwrap();
    }

    #[tokio::test]
    async fn non_success_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        let w = DiscordWebhook::unchecked(&server.uri());
        let err = w.send("hello").await.unwrap_err();
        assert!(matches!(err, MonitorError::Delivery(_)));
        assert!(err.to_string().contains("rate limited"), "{err}");
    }

    #[tokio::test]
    async fn created_201_is_not_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server)
            .await;

        let w = DiscordWebhook::unchecked(&server.uri());
        assert!(w.send("hello").await.is_err());
    }

    #[tokio::test]
    async fn unreachable_hook_error_hides_token() {
        let w = DiscordWebhook::unchecked("http://127.0.0.1:1/api/webhooks/123/supersecret");
        let err = w.send("x").await.unwrap_err();
        assert!(matches!(err, MonitorError::Delivery(_)));
        assert!(!err.to_string().contains("supersecret"), "{err}");
    }
}
