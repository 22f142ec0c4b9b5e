use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::text::truncate_chars;

use super::RenderError;

pub const MAX_ENTRIES: usize = 30;
const SUMMARY_CHARS: usize = 100;
pub const NO_SUMMARY: &str = "No summary available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub date: NaiveDate,
    pub url: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

/// Archive of recent daily pages, newest first, one entry per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollingIndex {
    entries: Vec<IndexEntry>,
}

impl RollingIndex {
    /// Missing or unreadable index files start a fresh archive.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "index unreadable, starting fresh");
                return Self::default();
            }
        };
        match serde_json::from_slice::<Vec<IndexEntry>>(&bytes) {
            Ok(mut entries) => {
                entries.truncate(MAX_ENTRIES);
                Self { entries }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "index corrupt, starting fresh");
                Self::default()
            }
        }
    }

    pub fn record(&mut self, date: NaiveDate, first_summary: Option<&str>, now: DateTime<Utc>) {
        let summary = first_summary
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| truncate_chars(s, SUMMARY_CHARS).to_string())
            .unwrap_or_else(|| NO_SUMMARY.to_string());
        self.entries.retain(|e| e.date != date);
        self.entries.insert(0, IndexEntry { date, url: format!("{date}.html"), summary, timestamp: now });
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        let json = serde_json::to_vec_pretty(&self.entries)
            .map_err(|source| RenderError::Index { path: path.to_path_buf(), source })?;
        super::write_file(path, &json)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 14, 6, 0, 0).unwrap()
    }

    #[test]
    fn newest_first_and_deduplicated_by_date() {
        let mut idx = RollingIndex::default();
        idx.record(day(10), Some("ten"), now());
        idx.record(day(11), Some("eleven"), now());
        idx.record(day(10), Some("ten again"), now());

        let dates: Vec<_> = idx.entries().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(10), day(11)]);
        assert_eq!(idx.entries()[0].summary, "ten again");
        assert_eq!(idx.entries()[0].url, "2026-01-10.html");
    }

    #[test]
    fn capped_at_thirty() {
        let mut idx = RollingIndex::default();
        let start = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        for i in 0..40 {
            idx.record(start + Duration::days(i), Some("x"), now());
        }
        assert_eq!(idx.entries().len(), MAX_ENTRIES);
        assert_eq!(idx.entries()[0].date, start + Duration::days(39));
    }

    #[test]
    fn summary_is_truncated_or_placeholder() {
        let mut idx = RollingIndex::default();
        idx.record(day(1), Some(&"é".repeat(150)), now());
        assert_eq!(idx.entries()[0].summary.chars().count(), 100);
        idx.record(day(2), None, now());
        assert_eq!(idx.entries()[0].summary, NO_SUMMARY);
        idx.record(day(3), Some("   "), now());
        assert_eq!(idx.entries()[0].summary, NO_SUMMARY);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".index.json");
        let mut idx = RollingIndex::default();
        idx.record(day(13), Some("MedGemma"), now());
        idx.save(&path).unwrap();
        assert_eq!(RollingIndex::load(&path), idx);
    }

    #[test]
    fn corrupt_or_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".index.json");
        assert!(RollingIndex::load(&path).entries().is_empty());
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(RollingIndex::load(&path).entries().is_empty());
    }
}
