use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use super::parse::{entries, parse_channel};
use super::types::FeedEntry;

const DEFAULT_RSS_URL: &str = "https://news.smol.ai/rss.xml";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; AI-Daily/1.0)";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid feed URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },
    #[error("failed to fetch feed {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("feed {url} answered with HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to read feed file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse RSS from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: rss::Error,
    },
}

#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RSS_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var("AI_DAILY_RSS_URL") {
            if !url.trim().is_empty() {
                cfg.url = url;
            }
        }
        if let Ok(timeout) = std::env::var("AI_DAILY_RSS_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        cfg
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<FeedEntry>, FeedError>;
    /// URL or path, for logs and error context.
    fn origin(&self) -> String;
}

pub struct HttpFeedSource {
    http: Client,
    url: String,
}

/// Absolute http(s) URL, or `InvalidUrl`.
fn feed_url(input: &str) -> Result<Url, FeedError> {
    let invalid = |reason: String| FeedError::InvalidUrl { input: input.to_string(), reason };
    let url = Url::parse(input.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

impl HttpFeedSource {
    pub fn new(cfg: &FeedConfig) -> Result<Self, FeedError> {
        let url = feed_url(&cfg.url)?;
        let http = Client::builder()
            .timeout(cfg.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FeedError::Transport { url: cfg.url.clone(), source })?;
        Ok(Self { http, url: url.to_string() })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Vec<FeedEntry>, FeedError> {
        let transport = |source| FeedError::Transport { url: self.url.clone(), source };
        let resp = self.http.get(&self.url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status { url: self.url.clone(), status });
        }
        let bytes = resp.bytes().await.map_err(transport)?;
        tracing::debug!(url = %self.url, bytes = bytes.len(), "feed downloaded");
        let channel = parse_channel(&bytes[..])
            .map_err(|source| FeedError::Parse { origin: self.origin(), source })?;
        Ok(entries(&channel))
    }

    fn origin(&self) -> String {
        self.url.clone()
    }
}

pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileFeedSource {
    async fn fetch(&self) -> Result<Vec<FeedEntry>, FeedError> {
        let xml = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FeedError::Io { path: self.path.clone(), source })?;
        let channel = parse_channel(&xml)
            .map_err(|source| FeedError::Parse { origin: self.origin(), source })?;
        Ok(entries(&channel))
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ONE_ITEM: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title><link>https://news.smol.ai/</link><description>d</description>
<item><title>Jan 13</title><link>https://news.smol.ai/issues/26-01-13-not-much/</link><description>body</description></item>
</channel></rss>"#;

    #[tokio::test]
    async fn file_source_reads_and_parses() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(ONE_ITEM.as_bytes()).unwrap();
        let src = FileFeedSource::new(f.path());
        let list = src.fetch().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title.as_deref(), Some("Jan 13"));
        assert_eq!(src.origin(), f.path().display().to_string());
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = FileFeedSource::new(dir.path().join("absent.xml"));
        let err = src.fetch().await.unwrap_err();
        assert!(matches!(err, FeedError::Io { .. }));
        assert!(err.to_string().contains("absent.xml"));
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"<html><body>nope</body></html>").unwrap();
        let err = FileFeedSource::new(f.path()).fetch().await.unwrap_err();
        assert!(matches!(err, FeedError::Parse { .. }));
    }

    #[test]
    fn feed_url_must_be_http() {
        assert!(feed_url("https://news.smol.ai/rss.xml").is_ok());
        assert!(matches!(feed_url("ftp://example.com/rss"), Err(FeedError::InvalidUrl { .. })));
        assert!(matches!(feed_url("not a url"), Err(FeedError::InvalidUrl { .. })));
        let cfg = FeedConfig { url: "file:///tmp/rss.xml".into(), ..FeedConfig::default() };
        assert!(HttpFeedSource::new(&cfg).is_err());
    }

    #[test]
    fn config_defaults() {
        let cfg = FeedConfig::default();
        assert_eq!(cfg.url, "https://news.smol.ai/rss.xml");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }
}
