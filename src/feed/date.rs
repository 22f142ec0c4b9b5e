use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

use super::types::FeedEntry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date '{input}', expected YYYY-MM-DD")]
    Malformed { input: String },
}

/// Strict `YYYY-MM-DD` parse for operator-supplied target dates.
pub fn parse_target_date(input: &str) -> Result<NaiveDate, DateError> {
    let s = input.trim();
    let malformed = || DateError::Malformed { input: input.to_string() };
    if s.len() != 10 {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| malformed())
}

fn issue_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 2-digit year is tried before the 4-digit one, as the feed publishes it
    RE.get_or_init(|| Regex::new(r"/issues/(\d{2}|\d{4})-(\d{2})-(\d{2})-").expect("static regex"))
}

/// Date embedded in an issue link (`/issues/26-01-13-slug/` or `/issues/2026-01-13-slug/`).
pub fn link_date(link: &str) -> Option<NaiveDate> {
    let caps = issue_link_re().captures(link)?;
    let year = match &caps[1] {
        y if y.len() == 2 => format!("20{y}"),
        y => y.to_string(),
    };
    let year: i32 = year.parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Calendar date of an entry: link date first, then the published timestamp (UTC).
pub fn extract_date(entry: &FeedEntry) -> Option<NaiveDate> {
    if let Some(d) = entry.link.as_deref().and_then(link_date) {
        return Some(d);
    }
    entry.published.map(|ts| ts.date_naive())
}

pub fn same_day<A: Datelike, B: Datelike>(a: &A, b: &B) -> bool {
    (a.year(), a.month(), a.day()) == (b.year(), b.month(), b.day())
}
