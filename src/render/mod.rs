use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use thiserror::Error;

use crate::analysis::types::AnalysisResult;

pub mod index;
pub mod pages;

use index::RollingIndex;

const STYLESHEET: &str = include_str!("styles.css");
const INDEX_DATA: &str = ".index.json";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode index {}: {source}", .path.display())]
    Index {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub output_dir: PathBuf,
    /// Public base URL of the published site, used in notification links.
    pub pages_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { output_dir: PathBuf::from("docs"), pages_url: None }
    }
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(dir) = std::env::var("AI_DAILY_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                cfg.output_dir = PathBuf::from(dir);
            }
        }
        cfg.pages_url = std::env::var("GITHUB_PAGES_URL").ok().filter(|u| !u.trim().is_empty());
        cfg
    }

    pub fn page_path(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(format!("{date}.html"))
    }

    pub fn page_url(&self, date: NaiveDate) -> Option<String> {
        self.pages_url
            .as_deref()
            .map(|base| format!("{}/{date}.html", base.trim_end_matches('/')))
    }
}

/// What a render pass wrote, for the run envelope.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RenderOutput {
    pub page: PathBuf,
    pub index: Option<PathBuf>,
    pub index_entries: usize,
}

pub struct HtmlRenderer {
    cfg: SiteConfig,
}

impl HtmlRenderer {
    pub fn new(cfg: SiteConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.cfg
    }

    /// Writes `<date>.html`, refreshes the stylesheet and the archive index.
    pub fn render_daily(&self, result: &AnalysisResult, now: DateTime<Utc>) -> Result<RenderOutput, RenderError> {
        self.write_stylesheet()?;
        let page = self.cfg.page_path(result.date);
        write_file(&page, pages::daily_page(result, now.year()).as_bytes())?;
        tracing::debug!(page = %page.display(), theme = %result.theme, "daily page written");

        let data = self.cfg.output_dir.join(INDEX_DATA);
        let mut idx = RollingIndex::load(&data);
        idx.record(result.date, result.summary.first().map(String::as_str), now);
        idx.save(&data)?;

        let index = self.cfg.output_dir.join("index.html");
        write_file(&index, pages::index_page(idx.entries(), now.year()).as_bytes())?;
        Ok(RenderOutput { page, index: Some(index), index_entries: idx.entries().len() })
    }

    /// Empty-state page for a date without content; the archive is left untouched.
    pub fn render_empty(&self, date: NaiveDate, reason: &str, now: DateTime<Utc>) -> Result<RenderOutput, RenderError> {
        self.write_stylesheet()?;
        let page = self.cfg.page_path(date);
        write_file(&page, pages::empty_page(date, reason, now.year()).as_bytes())?;
        tracing::debug!(page = %page.display(), "empty page written");
        Ok(RenderOutput { page, index: None, index_entries: 0 })
    }

    pub fn write_stylesheet(&self) -> Result<PathBuf, RenderError> {
        let path = self.cfg.output_dir.join("css").join("styles.css");
        write_file(&path, STYLESHEET.as_bytes())?;
        Ok(path)
    }
}

/// Creates parent directories as needed.
pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let wrap = |source| RenderError::Write { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    std::fs::write(path, bytes).map_err(wrap)
}
