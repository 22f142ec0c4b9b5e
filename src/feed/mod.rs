use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Subcommand};

use crate::telemetry::{self};
use crate::telemetry::ops::feed::Phase as FeedPhase;
use crate::util::time::DateArgs;

pub mod date;
pub mod extract;
pub mod parse;
pub mod resolve;
pub mod source;
pub mod text;
pub mod types;

use source::{FeedConfig, FeedError, FeedSource, FileFeedSource, HttpFeedSource};
use types::{FeedRangeResult, FeedShowResult, Resolution};

/// Where the RSS document comes from. Defaults to `AI_DAILY_RSS_URL`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Override the feed URL
    #[arg(long, conflicts_with = "feed_file")]
    pub feed_url: Option<String>,
    /// Read the feed from a local RSS file instead of the network
    #[arg(long)]
    pub feed_file: Option<PathBuf>,
}

impl SourceArgs {
    pub fn build(&self) -> Result<Box<dyn FeedSource>, FeedError> {
        if let Some(path) = &self.feed_file {
            return Ok(Box::new(FileFeedSource::new(path.clone())));
        }
        let mut cfg = FeedConfig::from_env();
        if let Some(url) = &self.feed_url {
            cfg.url = url.clone();
        }
        Ok(Box::new(HttpFeedSource::new(&cfg)?))
    }
}

/// ai-daily feed show/range
#[derive(Args)]
pub struct FeedCmd {
    #[command(subcommand)]
    pub cmd: FeedSub,
}

#[derive(Subcommand)]
pub enum FeedSub {
    /// Resolve the entry for a date and print its canonical content
    Show {
        #[command(flatten)]
        date: DateArgs,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the date range the feed currently covers
    Range {
        #[command(flatten)]
        source: SourceArgs,
    },
}

pub async fn run(args: FeedCmd) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span().entered();
    match args.cmd {
        FeedSub::Show { date, source } => show(date, source).await?,
        FeedSub::Range { source } => range(source).await?,
    }
    Ok(())
}

async fn show(date: DateArgs, source: SourceArgs) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([
        ("date", format!("{:?}", date.date)),
        ("relative", format!("{:?}", date.relative)),
        ("source", format!("{:?}", source)),
    ]).entered();

    let _s = log.span(&FeedPhase::Prepare).entered();
    let target = date.resolve(Utc::now())?;
    let src = source.build()?;
    drop(_s);

    let _s = log.span_kv(&FeedPhase::Fetch, [("origin", src.origin())]).entered();
    let entries = src.fetch().await.with_context(|| format!("fetch feed {}", src.origin()))?;
    log.info(format!("📡 {} entries from {}", entries.len(), src.origin()));
    drop(_s);

    let _s = log.span(&FeedPhase::Resolve).entered();
    let resolution = resolve::find_by_date(&entries, target);
    let available_range = resolve::date_range(&entries);
    let content = match &resolution {
        Resolution::Found(content) => {
            log.info(format!("✅ {}: {}", target, content.title));
            log.info(format!("   link: {}", content.link));
            log.info(format!("   content: {} chars", content.content.chars().count()));
            Some(content)
        }
        Resolution::NotFound { range, .. } => {
            log.warn(format!("📭 No entry for {target}; feed covers {range}"));
            None
        }
    };
    // Emit structured result when in JSON mode (stdout)
    if telemetry::config::json_mode() {
        let result = FeedShowResult { target_date: target, found: content.is_some(), content, available_range };
        log.result(&result)?;
    }
    Ok(())
}

async fn range(source: SourceArgs) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([("source", format!("{:?}", source))]).entered();

    let _s = log.span(&FeedPhase::Prepare).entered();
    let src = source.build()?;
    drop(_s);

    let _s = log.span_kv(&FeedPhase::Fetch, [("origin", src.origin())]).entered();
    let entries = src.fetch().await.with_context(|| format!("fetch feed {}", src.origin()))?;
    drop(_s);

    let _s = log.span(&FeedPhase::Range).entered();
    let range = resolve::date_range(&entries);
    let latest = resolve::latest_date(&entries);
    log.info(format!("📅 Feed range: {range} ({} entries)", entries.len()));
    if let Some(latest) = latest {
        log.info(format!("   latest: {latest}"));
    }
    if telemetry::config::json_mode() {
        let result = FeedRangeResult {
            min_date: range.min,
            max_date: range.max,
            latest_date: latest,
            total_entries: entries.len(),
        };
        log.result(&result)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_takes_precedence() {
        let args = SourceArgs { feed_url: None, feed_file: Some(PathBuf::from("/tmp/feed.xml")) };
        let src = args.build().unwrap();
        assert_eq!(src.origin(), "/tmp/feed.xml");
    }

    #[test]
    fn url_override_is_used() {
        let args = SourceArgs { feed_url: Some("https://example.com/rss.xml".into()), feed_file: None };
        let src = args.build().unwrap();
        assert_eq!(src.origin(), "https://example.com/rss.xml");
    }
}
