// src/ingest/mod.rs
pub mod feed;
pub mod fetcher;
pub mod sources;
pub mod timestamp;
pub mod types;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::error::{MonitorError, Result};
use crate::ingest::feed::FeedEntry;
use crate::ingest::fetcher::FeedFetcher;
use crate::ingest::timestamp::parse_timestamp;
use crate::ingest::types::{FeedSource, Post, TimeWindow};

/// A feed that could not be fetched or parsed. The run carries on without it.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: FeedSource,
    pub error: MonitorError,
}

/// Outcome of one pass over all sources.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Source-file order, then feed order within each source.
    pub posts: Vec<Post>,
    pub failures: Vec<SourceFailure>,
    /// Items dropped because their timestamp was missing or unparseable.
    pub skipped_items: usize,
}

/// Fetches every source and keeps the posts inside the time window.
#[derive(Clone)]
pub struct FeedMonitor {
    fetcher: FeedFetcher,
    workers: usize,
}

impl FeedMonitor {
    /// `workers` is the number of feeds fetched at once; 1 means strictly sequential.
    pub fn new(fetcher: FeedFetcher, workers: usize) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
        }
    }

    pub async fn fetch_recent_posts(
        &self,
        sources: &[FeedSource],
        window_hours: i64,
    ) -> Result<FetchReport> {
        let window = TimeWindow::from_hours(window_hours)?;
        tracing::debug!(timeframe = window.hours(), "valid timeframe to check for");
        Ok(self.fetch_window(sources, window, Utc::now()).await)
    }

    pub async fn fetch_window(
        &self,
        sources: &[FeedSource],
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> FetchReport {
        // `buffered` yields in input order even when fetches overlap
        let results: Vec<(FeedSource, Result<Vec<FeedEntry>>)> = stream::iter(sources.iter().cloned())
            .map(|source| {
                let fetcher = self.fetcher.clone();
                async move {
                    let res = fetcher.fetch(&source).await;
                    (source, res)
                }
            })
            .buffered(self.workers)
            .collect()
            .await;

        let mut report = FetchReport::default();
        for (source, result) in results {
            match result {
                Ok(entries) => {
                    let (mut posts, skipped) = select_recent(&source, entries, window, now);
                    tracing::debug!(url = %source, recent = posts.len(), skipped, "feed checked");
                    report.posts.append(&mut posts);
                    report.skipped_items += skipped;
                }
                Err(error) => {
                    tracing::error!(url = %source, error = %error, "feed fetch failed");
                    report.failures.push(SourceFailure { source, error });
                }
            }
        }
        report
    }
}

/// Convenience wrapper using the default fetcher, one feed at a time.
pub async fn fetch_recent_posts(sources: &[FeedSource], window_hours: i64) -> Result<FetchReport> {
    // validate before building anything network-facing
    TimeWindow::from_hours(window_hours)?;
    FeedMonitor::new(FeedFetcher::new()?, 1)
        .fetch_recent_posts(sources, window_hours)
        .await
}

/// Keep entries published strictly after the cutoff, in feed order.
///
/// Entries with a missing or unparseable timestamp are skipped and counted.
pub fn select_recent(
    source: &FeedSource,
    entries: Vec<FeedEntry>,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> (Vec<Post>, usize) {
    let mut posts = Vec::new();
    let mut skipped = 0usize;

    for entry in entries {
        let raw = entry.published.unwrap_or_default();
        let published_at = match parse_timestamp(&raw) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(url = %source, title = %entry.title, error = %e, "skipping item");
                skipped += 1;
                continue;
            }
        };
        if window.contains(now, published_at) {
            posts.push(Post {
                title: entry.title,
                link: entry.link,
                published: raw,
            });
        }
    }

    (posts, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(title: &str, published: Option<&str>) -> FeedEntry {
        FeedEntry {
            title: title.into(),
            link: format!("https://x.test/{title}"),
            published: published.map(str::to_string),
        }
    }

    fn src() -> FeedSource {
        FeedSource::parse("https://x.test/rss").unwrap()
    }

    #[test]
    fn keeps_recent_in_feed_order_and_raw_text() {
        let now = Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 0).unwrap();
        let w = TimeWindow::from_hours(24).unwrap();
        let entries = vec![
            entry("b", Some("Sat, 06 Sep 2025 11:00:00 GMT")),
            entry("old", Some("Thu, 04 Sep 2025 11:00:00 GMT")),
            entry("a", Some("2025-09-06T01:00:00Z")),
        ];
        let (posts, skipped) = select_recent(&src(), entries, w, now);
        assert_eq!(skipped, 0);
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a"]);
        assert_eq!(posts[0].published, "Sat, 06 Sep 2025 11:00:00 GMT");
    }

    #[test]
    fn bad_timestamps_are_skipped_not_fatal() {
        let now = Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 0).unwrap();
        let w = TimeWindow::from_hours(24).unwrap();
        let entries = vec![
            entry("nodate", None),
            entry("garbage", Some("last tuesday")),
            entry("ok", Some("2025-09-06T11:00:00Z")),
        ];
        let (posts, skipped) = select_recent(&src(), entries, w, now);
        assert_eq!(skipped, 2);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "ok");
    }

    #[test]
    fn cutoff_boundary_excluded() {
        let now = Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 0).unwrap();
        let w = TimeWindow::from_hours(1).unwrap();
        let entries = vec![
            entry("edge", Some("2025-09-06T11:00:00Z")),
            entry("inside", Some("2025-09-06T11:00:01Z")),
        ];
        let (posts, _) = select_recent(&src(), entries, w, now);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "inside");
    }

    #[tokio::test]
    async fn negative_timeframe_fails_before_network() {
        let sources = vec![FeedSource::parse("http://127.0.0.1:1/never-called").unwrap()];
        let err = fetch_recent_posts(&sources, -5).await.unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }
}
