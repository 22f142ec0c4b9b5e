use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::analysis::types::{AnalysisResult, Category, Item, Theme};

use super::index::IndexEntry;

const MAX_TAGS: usize = 4;
const SITE_TITLE: &str = "AI Daily";
const SITE_DESCRIPTION: &str = "A daily digest of AI news, summarized and classified automatically";
const SITE_SUBTITLE: &str = "AI news, one page a day";

/// Long-form date used on page headers, e.g. "Tuesday, January 13, 2026".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Only absolute http(s) links are rendered as anchors.
fn safe_url(url: &str) -> Option<&str> {
    let u = url.trim();
    let lower = u.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then_some(u)
}

fn head(title: &str, keywords: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<head>\n    <meta charset=\"UTF-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    <title>{}</title>\n    <meta name=\"description\" content=\"{}\">\n",
        text(title),
        attr(SITE_DESCRIPTION),
    ));
    if let Some(k) = keywords {
        out.push_str(&format!("    <meta name=\"keywords\" content=\"{}\">\n", attr(k)));
    }
    out.push_str("    <link rel=\"stylesheet\" href=\"css/styles.css\">\n</head>");
    out
}

fn shell(theme: Theme, head: &str, header: &str, main: &str, main_class: &str, year: i32) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
{head}
<body data-theme="{theme}">
    <div class="background-glow"></div>
    <div class="geometric-lines"></div>
    <div class="container">
{header}
        <main class="{main_class}">
{main}
        </main>
        <footer class="footer">
            <p>&copy; {year} {site} &middot; generated automatically</p>
        </footer>
    </div>
</body>
</html>
"#,
        theme = theme.as_str(),
        site = text(SITE_TITLE),
    )
}

fn header(badge: &str, centered: bool) -> String {
    let class = if centered { "header header-center" } else { "header" };
    format!(
        "        <header class=\"{class}\">\n            <div class=\"logo-icon\">🤖</div>\n            <h1>{}</h1>\n            {badge}\n        </header>",
        text(SITE_TITLE)
    )
}

pub fn daily_page(result: &AnalysisResult, year: i32) -> String {
    let date = format_date(result.date);
    let mut main = String::new();

    if !result.summary.is_empty() {
        main.push_str("            <section class=\"summary-card\">\n                <h2 class=\"section-title\">📌 Today's highlights</h2>\n                <ul class=\"summary-list\">\n");
        for line in &result.summary {
            main.push_str(&format!("                    <li class=\"summary-item\">{}</li>\n", text(line)));
        }
        main.push_str("                </ul>\n            </section>\n");
    }

    for cat in result.categories.iter().filter(|c| !c.items.is_empty()) {
        category_section(&mut main, cat);
    }

    if !result.keywords.is_empty() {
        main.push_str(&format!(
            "            <footer class=\"keywords-footer\">\n                <p># Keywords: {}</p>\n            </footer>\n",
            text(&result.keywords.join(" | "))
        ));
    }

    let meta_keywords = result
        .keywords
        .iter()
        .map(String::as_str)
        .chain(["AI", "daily", "news"])
        .collect::<Vec<_>>()
        .join(", ");
    let head = head(&format!("{SITE_TITLE} · {date}"), Some(&meta_keywords));
    let badge = format!("<div class=\"date-badge\">{}</div>", text(&date));
    shell(result.theme, &head, &header(&badge, false), &main, "main-content", year)
}

fn category_section(out: &mut String, cat: &Category) {
    let icon = if cat.icon.is_empty() { "📄" } else { cat.icon.as_str() };
    out.push_str(&format!(
        "            <section class=\"category-section\" id=\"{}\">\n                <div class=\"category-header\">\n                    <span class=\"category-icon\">{}</span>\n                    <h2 class=\"category-title\">{}</h2>\n                    <span class=\"category-count\">{}</span>\n                </div>\n                <div class=\"news-grid\">\n",
        attr(&cat.key),
        text(icon),
        text(&cat.name),
        cat.items.len(),
    ));
    for item in &cat.items {
        news_card(out, item);
    }
    out.push_str("                </div>\n            </section>\n");
}

fn news_card(out: &mut String, item: &Item) {
    let link = safe_url(&item.url)
        .map(|u| format!("<a href=\"{}\" class=\"item-link\" target=\"_blank\" rel=\"noopener\">Details</a>", attr(u)))
        .unwrap_or_default();
    out.push_str(&format!(
        "                    <article class=\"news-card\">\n                        <div class=\"news-card-header\">\n                            <h3 class=\"news-title\">{}</h3>\n                            {link}\n                        </div>\n                        <p class=\"news-summary\">{}</p>\n",
        text(&item.title),
        text(&item.summary),
    ));
    if !item.tags.is_empty() {
        let tags = item
            .tags
            .iter()
            .take(MAX_TAGS)
            .map(|t| format!("<span class=\"tag\">#{}</span>", text(t)))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!("                        <div class=\"item-tags\">{tags}</div>\n"));
    }
    out.push_str("                    </article>\n");
}

pub fn empty_page(date: NaiveDate, reason: &str, year: i32) -> String {
    let pretty = format_date(date);
    let main = format!(
        "            <div class=\"empty-state\">\n                <div class=\"empty-icon\">📭</div>\n                <h2>No news for this day</h2>\n                <p>Target date: <strong>{date}</strong></p>\n                <p>Reason: {}</p>\n                <a href=\"index.html\" class=\"btn-primary\">Back to archive</a>\n            </div>",
        text(reason),
    );
    let head = head(&format!("{SITE_TITLE} · {pretty} - no news"), None);
    let badge = format!("<div class=\"date-badge\">{}</div>", text(&pretty));
    shell(Theme::Gray, &head, &header(&badge, false), &main, "main-content", year)
}

pub fn index_page(entries: &[IndexEntry], year: i32) -> String {
    let mut list = String::new();
    for e in entries {
        list.push_str(&format!(
            "                    <article class=\"index-entry\">\n                        <a href=\"{}\" class=\"entry-link\">\n                            <div class=\"entry-header\">\n                                <span class=\"entry-date\">{}</span>\n                                <span class=\"entry-arrow\">→</span>\n                            </div>\n                            <p class=\"entry-summary\">{}</p>\n                        </a>\n                    </article>\n",
            attr(&e.url),
            text(&format_date(e.date)),
            text(&e.summary),
        ));
    }
    if list.is_empty() {
        list.push_str("                    <p class=\"empty-message\">No issues archived yet</p>\n");
    }
    let main = format!(
        "            <section class=\"index-section\">\n                <h2 class=\"section-title\">📅 Archive</h2>\n                <div class=\"index-entries\">\n{list}                </div>\n            </section>"
    );
    let head = head(&format!("{SITE_TITLE} - daily AI news"), None);
    let badge = format!("<p class=\"subtitle\">{}</p>", text(SITE_SUBTITLE));
    shell(Theme::Blue, &head, &header(&badge, true), &main, "main-content index-page", year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()
    }

    fn sample() -> AnalysisResult {
        let mut r = AnalysisResult::new(day(), Theme::Purple);
        r.summary = vec!["<script>alert(1)</script>".into(), "Second".into()];
        r.keywords = vec!["Claude".into(), "R&D".into()];
        r.categories = vec![
            Category { key: "model".into(), name: "Model Releases".into(), icon: "🤖".into(), items: vec![Item {
                title: "MedGemma 1.5".into(),
                summary: "4B medical model".into(),
                url: "https://news.smol.ai/issues/26-01-13-not-much/".into(),
                tags: (1..=6).map(|i| format!("t{i}")).collect(),
            }] },
            Category { key: "events".into(), name: "Industry Events".into(), icon: "📅".into(), items: vec![] },
        ];
        r
    }

    #[test]
    fn formats_long_date() {
        assert_eq!(format_date(day()), "Tuesday, January 13, 2026");
    }

    #[test]
    fn daily_page_is_themed_and_escaped() {
        let html = daily_page(&sample(), 2026);
        assert!(html.contains("<body data-theme=\"purple\">"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Claude | R&amp;D"));
        assert!(html.contains("Tuesday, January 13, 2026"));
    }

    #[test]
    fn empty_categories_skipped_and_tags_capped() {
        let html = daily_page(&sample(), 2026);
        assert!(html.contains("Model Releases"));
        assert!(!html.contains("Industry Events"));
        assert!(html.contains("#t4"));
        assert!(!html.contains("#t5"));
    }

    #[test]
    fn unsafe_links_are_not_rendered() {
        let mut r = sample();
        r.categories[0].items[0].url = "javascript:alert(1)".into();
        let html = daily_page(&r, 2026);
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("item-link"));
    }

    #[test]
    fn empty_page_is_gray_with_reason() {
        let html = empty_page(day(), "no entry for <date>", 2026);
        assert!(html.contains("data-theme=\"gray\""));
        assert!(html.contains("no entry for &lt;date&gt;"));
        assert!(html.contains("<strong>2026-01-13</strong>"));
    }

    #[test]
    fn index_lists_entries_or_placeholder() {
        assert!(index_page(&[], 2026).contains("No issues archived yet"));
        let entry = IndexEntry {
            date: day(),
            url: "2026-01-13.html".into(),
            summary: "A & B".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 14, 0, 0, 0).unwrap(),
        };
        let html = index_page(&[entry], 2026);
        assert!(html.contains("href=\"2026-01-13.html\""));
        assert!(html.contains("A &amp; B"));
    }
}
