//! rss-monitor — binary entrypoint.
//! Parses flags, scopes logging to this run, and maps the outcome to an exit code.

use std::process::ExitCode;

use clap::Parser;
use tracing::instrument::WithSubscriber;

use rss_monitor::cli::{self, Cli, Outcome};
use rss_monitor::logging;

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let outcome = cli::run(cli).await?;
    tracing::debug!(?outcome, "run finished");
    Ok(outcome)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev so webhook URLs and SMTP_PASSWORD can live there.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let dispatch = logging::dispatch(cli.debug, cli.log_format);

    match run(cli).with_subscriber(dispatch.clone()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::dispatcher::with_default(&dispatch, || {
                tracing::error!(error = %format!("{e:#}"), "run failed");
            });
            ExitCode::FAILURE
        }
    }
}
