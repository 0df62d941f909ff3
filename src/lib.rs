// src/lib.rs
// Library surface for the binary and the integration tests.
//
// Pipeline: sources file → fetch + time filter → template → notifier.

pub mod cli;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod notify;
pub mod render;

// ---- Re-exports for a stable public API ----
pub use crate::error::{MonitorError, Result};
pub use crate::ingest::sources::read_sources;
pub use crate::ingest::timestamp::parse_timestamp;
pub use crate::ingest::types::{FeedSource, Post, TimeWindow};
pub use crate::ingest::{fetch_recent_posts, FeedMonitor, FetchReport, SourceFailure};
pub use crate::notify::{DiscordWebhook, EmailConfig, EmailSender, Notifier, SlackWebhook};
pub use crate::render::render;
