// src/ingest/sources.rs
use std::fs;
use std::path::Path;

use crate::error::{MonitorError, Result};
use crate::ingest::types::FeedSource;

/// Read feed URLs from a newline-delimited file.
///
/// Lines starting with `#` are comments. Any other line that does not start
/// with `http://` or `https://` is ignored. An empty result is an error: a
/// sources file with nothing in it is a misconfiguration.
pub fn read_sources(path: &Path) -> Result<Vec<FeedSource>> {
    if path.as_os_str().is_empty() {
        return Err(MonitorError::config(
            "must provide a file containing the RSS links",
        ));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        MonitorError::config(format!("error opening file {}: {e}", path.display()))
    })?;

    let sources = parse_sources(&content);
    if sources.is_empty() {
        return Err(MonitorError::config(format!(
            "no links pulled from {}",
            path.display()
        )));
    }

    tracing::debug!(rss_file = %path.display(), count = sources.len(), "read RSS links");
    Ok(sources)
}

fn parse_sources(content: &str) -> Vec<FeedSource> {
    content
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.starts_with('#'))
        .filter_map(FeedSource::parse)
        .collect()
}
