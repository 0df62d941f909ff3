// src/ingest/types.rs
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// One feed URL read from the sources file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedSource(String);

impl FeedSource {
    /// Accepts only `http://` and `https://` URLs.
    pub fn parse(line: &str) -> Option<Self> {
        if line.starts_with("https://") || line.starts_with("http://") {
            Some(Self(line.to_string()))
        } else {
            None
        }
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A feed item that fell inside the time window.
///
/// Field names are what templates see (`{{Title}}`, `{{Link}}`, `{{Published}}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Post {
    pub title: String,
    pub link: String,
    /// Timestamp text exactly as the feed wrote it.
    pub published: String,
}

/// Trailing window, in whole hours, that counts as "recent".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    hours: u32,
}

impl TimeWindow {
    pub fn from_hours(hours: i64) -> Result<Self> {
        if hours < 0 {
            return Err(MonitorError::config(format!(
                "timeframe must be zero or more hours, got {hours}"
            )));
        }
        let hours = u32::try_from(hours)
            .map_err(|_| MonitorError::config(format!("timeframe of {hours} hours is too large")))?;
        Ok(Self { hours })
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    /// Saturates at the earliest representable instant for huge windows.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        ChronoDuration::try_hours(i64::from(self.hours))
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Strictly after the cutoff; an item exactly on it is too old.
    pub fn contains(&self, now: DateTime<Utc>, published: DateTime<Utc>) -> bool {
        self.cutoff(now) < published
    }
}
