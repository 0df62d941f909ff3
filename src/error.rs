// src/error.rs
use thiserror::Error;

/// Every failure the monitor can report.
///
/// `Fetch` and `Parse` are soft: the pipeline records them per source / per
/// item and keeps going. All other kinds end the run.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("fetch error for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("unable to parse timestamp {raw:?}: {reason}")]
    Parse { raw: String, reason: String },

    #[error("template error: {0}")]
    Template(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("delivery error: {0}")]
    Delivery(String),
}

impl MonitorError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
