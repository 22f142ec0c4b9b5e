use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::render::SiteConfig;

use super::message::{actions_url, html_body, subject, MailContext};
use super::{Notice, Notifier, NotifyError};

const DEFAULT_SMTP_PORT: u16 = 587;
const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub to: String,
}

impl SmtpConfig {
    /// `None` when mail is disabled or any of host/user/password/recipient is missing.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let disabled = get("DISABLE_EMAIL_NOTIFICATION")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if disabled {
            return None;
        }
        let non_empty = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let port = non_empty("SMTP_PORT").and_then(|p| p.trim().parse().ok()).unwrap_or(DEFAULT_SMTP_PORT);
        Some(Self {
            host: non_empty("SMTP_HOST")?,
            port,
            user: non_empty("SMTP_USER")?,
            password: non_empty("SMTP_PASSWORD")?,
            to: non_empty("NOTIFICATION_TO")?,
        })
    }
}

/// SMTP notifier (STARTTLS, authenticated). Sends one HTML mail per notice.
pub struct EmailNotifier {
    cfg: SmtpConfig,
    site: SiteConfig,
    actions_url: Option<String>,
}

impl EmailNotifier {
    pub fn new(cfg: SmtpConfig, site: SiteConfig, actions_url: Option<String>) -> Self {
        Self { cfg, site, actions_url }
    }

    pub fn from_env(site: &SiteConfig) -> Option<Self> {
        let cfg = SmtpConfig::from_env()?;
        let env = |k: &str| std::env::var(k).ok();
        let actions = actions_url(
            env("GITHUB_SERVER_URL").as_deref(),
            env("GITHUB_REPOSITORY").as_deref(),
            env("GITHUB_RUN_ID").as_deref(),
        );
        Some(Self::new(cfg, site.clone(), actions))
    }

    fn context(&self, notice: &Notice) -> MailContext {
        let date = notice.date();
        let page_html = match notice {
            Notice::Success { .. } => std::fs::read_to_string(self.site.page_path(date)).ok(),
            _ => None,
        };
        MailContext {
            page_url: self.site.page_url(date),
            page_html,
            actions_url: self.actions_url.clone(),
        }
    }

    pub fn build_message(&self, notice: &Notice) -> Result<Message, NotifyError> {
        let mailbox = |input: &str| {
            input
                .parse::<Mailbox>()
                .map_err(|source| NotifyError::Address { input: input.to_string(), source })
        };
        let body = html_body(notice, &self.context(notice), Utc::now());
        let msg = Message::builder()
            .from(mailbox(&self.cfg.user)?)
            .to(mailbox(&self.cfg.to)?)
            .subject(subject(notice))
            .header(ContentType::TEXT_HTML)
            .body(body)?;
        Ok(msg)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let msg = self.build_message(notice)?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.cfg.host)?
            .port(self.cfg.port)
            .credentials(Credentials::new(self.cfg.user.clone(), self.cfg.password.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        tracing::debug!(host = %self.cfg.host, port = self.cfg.port, "sending notification mail");
        mailer.send(msg).await?;
        Ok(())
    }
}
