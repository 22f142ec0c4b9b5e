use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Success,
    Empty,
    Error,
}

impl Status {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Some(Status::Success),
            "empty" => Some(Status::Empty),
            "error" => Some(Status::Error),
            _ => None,
        }
    }
}

/// Page color scheme picked from the dominant topic of the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Blue,
    Indigo,
    Purple,
    Green,
    Orange,
    Pink,
    Teal,
    Gray,
}

impl Theme {
    pub const ALL: [Theme; 8] = [
        Theme::Blue,
        Theme::Indigo,
        Theme::Purple,
        Theme::Green,
        Theme::Orange,
        Theme::Pink,
        Theme::Teal,
        Theme::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Blue => "blue",
            Theme::Indigo => "indigo",
            Theme::Purple => "purple",
            Theme::Green => "green",
            Theme::Orange => "orange",
            Theme::Pink => "pink",
            Theme::Teal => "teal",
            Theme::Gray => "gray",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Theme::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub name: String,
    pub icon: String,
    pub items: Vec<Item>,
}

/// Structured daily digest. The six leading fields are always present on the wire;
/// the trailing ones are diagnostics and only appear when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: Status,
    pub date: NaiveDate,
    pub theme: Theme,
    pub summary: Vec<String>,
    pub keywords: Vec<String>,
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<crate::feed::types::CanonicalContent>,
}

impl AnalysisResult {
    /// Skeleton with every required key at its default.
    pub fn new(date: NaiveDate, theme: Theme) -> Self {
        Self {
            status: Status::Success,
            date,
            theme,
            summary: Vec::new(),
            keywords: Vec::new(),
            categories: Vec::new(),
            reason: None,
            parse_error: None,
            repairs: Vec::new(),
            fallback_reason: None,
            raw_content: None,
        }
    }

    pub fn empty(date: NaiveDate, theme: Theme, reason: impl Into<String>) -> Self {
        Self { status: Status::Empty, reason: Some(reason.into()), ..Self::new(date, theme) }
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}
