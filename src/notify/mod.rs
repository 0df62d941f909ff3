// src/notify/mod.rs
pub mod discord;
pub mod email;
pub mod slack;
mod webhook;

use async_trait::async_trait;

use crate::error::Result;

pub use discord::DiscordWebhook;
pub use email::{EmailConfig, EmailSender};
pub use slack::SlackWebhook;

/// A destination for the rendered message. One attempt per call, no retries.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}
