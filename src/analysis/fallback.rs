use chrono::NaiveDate;

use crate::feed::text::{plain_text, truncate_chars};
use crate::feed::types::CanonicalContent;

use super::settings::AnalysisSettings;
use super::types::{AnalysisResult, Category, Item};

const TITLE_CHARS: usize = 100;
const DESCRIPTION_CHARS: usize = 200;

/// Minimal, renderable result for when the analysis call itself failed.
pub struct FallbackPolicy<'a> {
    settings: &'a AnalysisSettings,
}

impl<'a> FallbackPolicy<'a> {
    pub fn new(settings: &'a AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn on_transport_failure(
        &self,
        content: &CanonicalContent,
        target: NaiveDate,
        error: &dyn std::fmt::Display,
    ) -> AnalysisResult {
        let s = self.settings;
        let title = truncate_chars(&content.title, TITLE_CHARS);
        let description = plain_text(&content.description);

        let mut r = AnalysisResult::new(target, s.default_theme);
        r.summary = vec![s.degraded_notice.clone(), format!("Title: {title}...")];
        r.keywords = vec!["AI".to_string(), "News".to_string()];
        if let Some(spec) = s.categories.first() {
            r.categories = vec![Category {
                key: spec.key.to_string(),
                name: spec.name.to_string(),
                icon: spec.icon.to_string(),
                items: vec![Item {
                    title: title.to_string(),
                    summary: truncate_chars(&description, DESCRIPTION_CHARS).to_string(),
                    url: content.link.clone(),
                    tags: vec!["AI".to_string()],
                }],
            }];
        }
        r.fallback_reason = Some(error.to_string());
        r.raw_content = Some(content.clone());
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::Status;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()
    }

    #[test]
    fn builds_single_item_from_content() {
        let settings = AnalysisSettings::default();
        let content = CanonicalContent {
            title: "not much happened today".into(),
            link: "https://news.smol.ai/issues/26-01-13-not-much/".into(),
            description: "<p>Quiet <b>day</b> in AI</p>".into(),
            content: "full".into(),
            ..Default::default()
        };
        let r = FallbackPolicy::new(&settings).on_transport_failure(&content, day(), &"request timed out");

        assert_eq!(r.status, Status::Success);
        assert_eq!(r.date, day());
        assert_eq!(r.theme, settings.default_theme);
        assert_eq!(r.summary[1], "Title: not much happened today...");
        assert_eq!(r.keywords, vec!["AI", "News"]);
        assert_eq!(r.categories.len(), 1);
        assert_eq!(r.categories[0].key, "model");
        let item = &r.categories[0].items[0];
        assert_eq!(item.summary, "Quiet day in AI");
        assert_eq!(item.url, content.link);
        assert_eq!(item.tags, vec!["AI"]);
        assert_eq!(r.fallback_reason.as_deref(), Some("request timed out"));
        assert_eq!(r.raw_content.as_ref(), Some(&content));
    }

    #[test]
    fn long_fields_are_truncated() {
        let settings = AnalysisSettings::default();
        let content = CanonicalContent {
            title: "t".repeat(250),
            description: "d".repeat(500),
            ..Default::default()
        };
        let r = FallbackPolicy::new(&settings).on_transport_failure(&content, day(), &"boom");
        let item = &r.categories[0].items[0];
        assert_eq!(item.title.chars().count(), 100);
        assert_eq!(item.summary.chars().count(), 200);
        assert_eq!(r.summary[1], format!("Title: {}...", "t".repeat(100)));
    }

    #[test]
    fn empty_content_still_yields_well_formed_result() {
        let settings = AnalysisSettings::default();
        let r = FallbackPolicy::new(&settings).on_transport_failure(&CanonicalContent::default(), day(), &"x");
        assert_eq!(r.summary.len(), 2);
        assert_eq!(r.categories[0].items[0].title, "");
    }
}
