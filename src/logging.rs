// src/logging.rs
//! Log output is built as a `Dispatch` handed to the caller, not installed
//! globally. The binary scopes a whole run to it; tests build their own.

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Compact human-readable lines
    Text,
}

/// `RUST_LOG`, when set, wins over the debug flag.
pub fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)))
}

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "rss_monitor=debug,info"
    } else {
        "info"
    }
}

/// Dispatcher writing to stdout.
pub fn dispatch(debug: bool, format: LogFormat) -> Dispatch {
    dispatch_to(env_filter(debug), format, std::io::stdout)
}

pub fn dispatch_to<W>(filter: EnvFilter, format: LogFormat, writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => Dispatch::new(
            registry.with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Text => Dispatch::new(registry.with(fmt::layer().compact().with_writer(writer))),
    }
}
