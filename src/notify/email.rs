// src/notify/email.rs
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::AsyncSmtpTransport;
use lettre::{AsyncTransport, Tokio1Executor};

use super::Notifier;
use crate::error::{MonitorError, Result};

pub const SMTP_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SUBJECT: &str = "RSS Monitor";

#[derive(Clone)]
pub struct EmailConfig {
    pub from: String,
    /// Empty or `None` submits without authentication.
    pub password: Option<String>,
    /// Comma-separated recipients.
    pub to: String,
    pub subject: String,
    pub host: String,
    pub port: i64,
    pub html: bool,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("from", &self.from)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("to", &self.to)
            .field("subject", &self.subject)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("html", &self.html)
            .finish()
    }
}

impl EmailConfig {
    /// Port range is checked first so a bad port fails before any feed is fetched.
    pub fn validate_port(&self) -> Result<u16> {
        u16::try_from(self.port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| MonitorError::config(format!("invalid smtp port {}", self.port)))
    }
}

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    subject: String,
    html: bool,
}

impl EmailSender {
    pub fn new(cfg: &EmailConfig) -> Result<Self> {
        let port = cfg.validate_port()?;
        if cfg.host.trim().is_empty() {
            return Err(MonitorError::config("smtp host is empty"));
        }

        let from: Mailbox = cfg
            .from
            .parse()
            .map_err(|e| MonitorError::config(format!("invalid from address {:?}: {e}", cfg.from)))?;

        let to = cfg
            .to
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Mailbox>()
                    .map_err(|e| MonitorError::config(format!("invalid to address {s:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        if to.is_empty() {
            return Err(MonitorError::config("no recipient addresses"));
        }

        // STARTTLS when the relay offers it, plain otherwise
        let tls = TlsParameters::new(cfg.host.clone())
            .map_err(|e| MonitorError::config(format!("smtp tls parameters: {e}")))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(cfg.host.as_str())
            .port(port)
            .tls(Tls::Opportunistic(tls))
            .timeout(Some(SMTP_TIMEOUT));

        if let Some(pass) = cfg.password.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.credentials(Credentials::new(cfg.from.clone(), pass.to_string()));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
            to,
            subject: cfg.subject.clone(),
            html: cfg.html,
        })
    }

    /// Build the MIME message: headers, blank line, body.
    pub fn compose(&self, body: &str) -> Result<Message> {
        let content_type = if self.html {
            header::ContentType::TEXT_HTML
        } else {
            header::ContentType::TEXT_PLAIN
        };

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(self.subject.clone())
            .header(content_type);
        for rcpt in &self.to {
            builder = builder.to(rcpt.clone());
        }

        builder
            .body(body.to_string())
            .map_err(|e| MonitorError::config(format!("build email: {e}")))
    }
}

#[async_trait]
impl Notifier for EmailSender {
    async fn send(&self, message: &str) -> Result<()> {
        let msg = self.compose(message)?;
        self.mailer
            .send(msg)
            .await
            .map_err(|e| MonitorError::Delivery(format!("send email: {e}")))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
