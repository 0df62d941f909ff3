// src/cli.rs
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use crate::error::{MonitorError, Result};
use crate::ingest::fetcher::FeedFetcher;
use crate::ingest::sources::read_sources;
use crate::ingest::types::TimeWindow;
use crate::ingest::FeedMonitor;
use crate::logging::LogFormat;
use crate::notify::email::DEFAULT_SUBJECT;
use crate::notify::{DiscordWebhook, EmailConfig, EmailSender, Notifier, SlackWebhook};
use crate::render::render;

#[derive(Parser, Debug)]
#[command(name = "rss-monitor", version)]
#[command(about = "Monitor RSS feeds and send recent posts.")]
#[command(
    long_about = "Monitor RSS feeds based on the timeframe provided and send recent posts to different services"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// File containing the RSS links to scan
    #[arg(short, long, global = true, value_name = "PATH")]
    pub rss: Option<PathBuf>,

    /// File used as a template for the message to send
    #[arg(short, long, global = true, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Only get articles that were posted in the past number of hours
    #[arg(short = 'f', long, global = true, default_value_t = 24, allow_negative_numbers = true)]
    pub timeframe: i64,

    /// Number of feeds fetched at the same time
    #[arg(short = 'j', long, global = true, default_value_t = 1)]
    pub workers: usize,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send the recent posts to a Discord webhook
    Discord {
        /// Discord webhook to use
        #[arg(short, long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
        webhook: String,
    },
    /// Send the recent posts to a Slack webhook
    Slack {
        /// Slack webhook to use
        #[arg(short, long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
        webhook: String,
    },
    /// Send the recent posts as an email (Gmail: smtp.gmail.com:587)
    Email(EmailArgs),
}

#[derive(Args, Debug)]
pub struct EmailArgs {
    /// Sending FROM address
    #[arg(long)]
    pub from: String,
    /// Sending FROM password (leave empty for no auth)
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Comma-separated TO addresses
    #[arg(long)]
    pub to: String,
    /// Email subject
    #[arg(long, default_value = DEFAULT_SUBJECT)]
    pub subject: String,
    /// SMTP host address
    #[arg(long)]
    pub host: String,
    /// SMTP port
    #[arg(long, allow_negative_numbers = true)]
    pub port: i64,
    /// Send as an HTML email
    #[arg(long)]
    pub html: bool,
}

impl From<&EmailArgs> for EmailConfig {
    fn from(a: &EmailArgs) -> Self {
        Self {
            from: a.from.clone(),
            password: a.password.clone(),
            to: a.to.clone(),
            subject: a.subject.clone(),
            host: a.host.clone(),
            port: a.port,
            html: a.html,
        }
    }
}

/// Everything the pipeline needs apart from the sink.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub rss: PathBuf,
    pub template: PathBuf,
    pub timeframe: i64,
    pub workers: usize,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            rss: cli.rss.clone().unwrap_or_default(),
            template: cli.template.clone().unwrap_or_default(),
            timeframe: cli.timeframe,
            workers: cli.workers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    /// Template produced no output.
    NothingToSend,
}

/// Build the sink for the chosen subcommand. Validates before any network use.
pub fn build_notifier(cmd: &Commands) -> Result<Box<dyn Notifier>> {
    let notifier: Box<dyn Notifier> = match cmd {
        Commands::Discord { webhook } => Box::new(DiscordWebhook::new(webhook)?),
        Commands::Slack { webhook } => Box::new(SlackWebhook::new(webhook)?),
        Commands::Email(args) => Box::new(EmailSender::new(&EmailConfig::from(args))?),
    };
    Ok(notifier)
}

pub async fn run(cli: Cli) -> Result<Outcome> {
    let notifier = build_notifier(&cli.command)?;
    run_pipeline(&RunOptions::from(&cli), notifier.as_ref()).await
}

/// Read sources, fetch, render, deliver.
pub async fn run_pipeline(opts: &RunOptions, notifier: &dyn Notifier) -> Result<Outcome> {
    if opts.template.as_os_str().is_empty() {
        return Err(MonitorError::config("must provide a template file"));
    }
    let window = TimeWindow::from_hours(opts.timeframe)?;
    let sources = read_sources(&opts.rss)?;

    let monitor = FeedMonitor::new(FeedFetcher::new()?, opts.workers);
    let report = monitor.fetch_window(&sources, window, Utc::now()).await;
    tracing::info!(
        number = report.posts.len(),
        failed_sources = report.failures.len(),
        skipped_items = report.skipped_items,
        "received posts"
    );

    let message = render(&opts.template, &report.posts)?;
    if message.is_empty() {
        tracing::info!(sink = notifier.name(), "empty message, not sending");
        return Ok(Outcome::NothingToSend);
    }

    notifier.send(&message).await?;
    tracing::info!(sink = notifier.name(), "successfully sent notification");
    Ok(Outcome::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_around_subcommand() {
        let cli = Cli::try_parse_from([
            "rss-monitor",
            "--rss",
            "feeds.txt",
            "discord",
            "--template",
            "msg.tmpl",
            "-f",
            "-3",
            "--webhook",
            "https://discord.com/api/webhooks/1/a",
        ])
        .unwrap();
        assert_eq!(cli.rss.as_deref(), Some(std::path::Path::new("feeds.txt")));
        assert_eq!(cli.template.as_deref(), Some(std::path::Path::new("msg.tmpl")));
        assert_eq!(cli.timeframe, -3);
        assert_eq!(cli.workers, 1);
        assert!(matches!(cli.command, Commands::Discord { .. }));
    }

    #[test]
    fn email_defaults() {
        let cli = Cli::try_parse_from([
            "rss-monitor",
            "-r",
            "f.txt",
            "-t",
            "t.tmpl",
            "email",
            "--from",
            "me@example.test",
            "--to",
            "you@example.test",
            "--host",
            "smtp.example.test",
            "--port",
            "587",
        ])
        .unwrap();
        assert_eq!(cli.timeframe, 24);
        let Commands::Email(args) = &cli.command else {
            panic!("expected email subcommand");
        };
        assert_eq!(args.subject, DEFAULT_SUBJECT);
        assert!(!args.html);
        assert_eq!(EmailConfig::from(args).port, 587);
    }

    #[test]
    fn invalid_webhook_rejected_before_fetch() {
        let cmd = Commands::Slack {
            webhook: "https://example.com/hook".into(),
        };
        assert!(matches!(
            build_notifier(&cmd).err().unwrap(),
            MonitorError::Validation(_)
        ));
    }

    #[test]
    fn bad_port_rejected_before_fetch() {
        let cmd = Commands::Email(EmailArgs {
            from: "me@example.test".into(),
            password: None,
            to: "you@example.test".into(),
            subject: DEFAULT_SUBJECT.into(),
            host: "smtp.example.test".into(),
            port: 70_000,
            html: false,
        });
        assert!(matches!(
            build_notifier(&cmd).err().unwrap(),
            MonitorError::Config(_)
        ));
    }
}
