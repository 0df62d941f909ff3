// src/render.rs
//! Turns the collected posts into the notification body using a
//! user-written Handlebars template.
//!
//! The template sees `{{Date}}` (today, `YYYY-MM-DD`) and `{{#each Posts}}`
//! with `{{Title}}`, `{{Link}}` and `{{Published}}` per post. Output is plain
//! text; nothing is HTML-escaped.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use handlebars::{no_escape, Handlebars};
use serde::Serialize;

use crate::error::{MonitorError, Result};
use crate::ingest::types::Post;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderContext<'a> {
    pub date: String,
    pub posts: &'a [Post],
}

/// Render with today's local date.
///
/// An empty string is a valid result and means "nothing to send".
pub fn render(template_path: &Path, posts: &[Post]) -> Result<String> {
    render_with_date(template_path, posts, Local::now().date_naive())
}

pub fn render_with_date(template_path: &Path, posts: &[Post], today: NaiveDate) -> Result<String> {
    if template_path.as_os_str().is_empty() {
        return Err(MonitorError::config("must provide a template file"));
    }

    let source = fs::read_to_string(template_path).map_err(|e| {
        MonitorError::Template(format!("reading {}: {e}", template_path.display()))
    })?;

    let ctx = RenderContext {
        date: today.format("%Y-%m-%d").to_string(),
        posts,
    };

    let mut hb = Handlebars::new();
    hb.register_escape_fn(no_escape);
    let out = hb
        .render_template(&source, &ctx)
        .map_err(|e| MonitorError::Template(format!("{}: {e}", template_path.display())))?;

    tracing::debug!(template_file = %template_path.display(), bytes = out.len(), "generated message from template file");
    Ok(out)
}
