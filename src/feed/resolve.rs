use chrono::NaiveDate;

use super::date::{extract_date, link_date, same_day};
use super::extract::extract;
use super::types::{DateRange, FeedEntry, Resolution};

/// First entry (feed order) whose calendar date equals `target`.
pub fn find_by_date(entries: &[FeedEntry], target: NaiveDate) -> Resolution {
    let hit = entries
        .iter()
        .find(|e| extract_date(e).is_some_and(|d| same_day(&d, &target)));
    match hit {
        Some(entry) => Resolution::Found(extract(entry)),
        None => Resolution::NotFound { target, range: date_range(entries) },
    }
}

/// Min/max over link-embedded dates only; timestamp-only entries are excluded.
pub fn date_range(entries: &[FeedEntry]) -> DateRange {
    let mut dates = entries.iter().filter_map(|e| e.link.as_deref().and_then(link_date));
    let Some(first) = dates.next() else { return DateRange::default() };
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    DateRange { min: Some(min), max: Some(max) }
}

/// Date of the first dated entry; the feed lists newest first.
pub fn latest_date(entries: &[FeedEntry]) -> Option<NaiveDate> {
    entries.iter().find_map(extract_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn issue(slug: &str, title: &str) -> FeedEntry {
        FeedEntry {
            title: Some(title.to_string()),
            link: Some(format!("https://news.smol.ai/issues/{slug}/")),
            summary: Some(format!("{title} body")),
            ..Default::default()
        }
    }

    fn sample_feed() -> Vec<FeedEntry> {
        vec![
            issue("26-01-13-not-much", "Jan 13"),
            issue("26-01-12-quiet-day", "Jan 12"),
            issue("26-01-10-launches", "Jan 10"),
        ]
    }

    #[test]
    fn empty_feed_is_not_found_with_empty_range() {
        let target = ymd(2026, 1, 13);
        match find_by_date(&[], target) {
            Resolution::NotFound { target: t, range } => {
                assert_eq!(t, target);
                assert!(range.is_empty());
                assert_eq!(range.to_string(), "none");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn finds_matching_issue() {
        match find_by_date(&sample_feed(), ymd(2026, 1, 12)) {
            Resolution::Found(c) => assert_eq!(c.title, "Jan 12"),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn missing_date_reports_available_range() {
        match find_by_date(&sample_feed(), ymd(2026, 1, 11)) {
            Resolution::NotFound { range, .. } => {
                assert_eq!(range.min, Some(ymd(2026, 1, 10)));
                assert_eq!(range.max, Some(ymd(2026, 1, 13)));
                assert_eq!(range.to_string(), "2026-01-10..2026-01-13");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn first_match_in_feed_order_wins() {
        let mut feed = sample_feed();
        feed.push(issue("26-01-13-second-edition", "Jan 13 again"));
        match find_by_date(&feed, ymd(2026, 1, 13)) {
            Resolution::Found(c) => assert_eq!(c.title, "Jan 13"),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn lookup_is_idempotent() {
        let feed = sample_feed();
        let target = ymd(2026, 1, 10);
        assert_eq!(find_by_date(&feed, target), find_by_date(&feed, target));
    }

    #[test]
    fn timestamp_only_entry_matches_but_is_not_in_range() {
        let stamped = FeedEntry {
            title: Some("Stamped".into()),
            link: Some("https://example.com/post".into()),
            published: Some(Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap()),
            ..Default::default()
        };
        let mut feed = vec![stamped];
        feed.extend(sample_feed());

        assert!(matches!(find_by_date(&feed, ymd(2026, 2, 1)), Resolution::Found(ref c) if c.title == "Stamped"));
        let range = date_range(&feed);
        assert_eq!(range.max, Some(ymd(2026, 1, 13)));
        assert_eq!(latest_date(&feed), Some(ymd(2026, 2, 1)));
        assert_eq!(latest_date(&sample_feed()), Some(ymd(2026, 1, 13)));
    }

    #[test]
    fn undated_entries_are_skipped() {
        let feed = vec![FeedEntry { title: Some("no date".into()), ..Default::default() }];
        assert!(date_range(&feed).is_empty());
        assert_eq!(latest_date(&feed), None);
        assert!(matches!(find_by_date(&feed, ymd(2026, 1, 1)), Resolution::NotFound { .. }));
    }
}
