use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One published item from the source feed. Nothing is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Full-content blocks in feed order (RSS `content:encoded`).
    #[serde(default)]
    pub content: Vec<String>,
    /// Structured publication timestamp, already normalized to UTC.
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_raw: Option<String>,
    #[serde(default)]
    pub updated_raw: Option<String>,
}

/// Normalized record handed to the analysis step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalContent {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub description: String,
    pub content: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{min}..{max}"),
            _ => write!(f, "none"),
        }
    }
}

/// Outcome of looking a target date up in the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(CanonicalContent),
    NotFound { target: NaiveDate, range: DateRange },
}

// Envelope types for `feed show` / `feed range`
#[derive(Serialize)]
pub struct FeedShowResult<'a> {
    pub target_date: NaiveDate,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a CanonicalContent>,
    pub available_range: DateRange,
}

#[derive(Serialize)]
pub struct FeedRangeResult {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
    pub total_entries: usize,
}
