use super::types::{CanonicalContent, FeedEntry};

/// Normalize any feed entry into canonical content. Never fails; absent fields become "".
pub fn extract(entry: &FeedEntry) -> CanonicalContent {
    let title = entry.title.clone().unwrap_or_default();
    let link = entry.link.clone().unwrap_or_default();
    let guid = entry.guid.clone().filter(|g| !g.is_empty()).unwrap_or_else(|| link.clone());
    let description = entry.summary.clone().unwrap_or_default();

    let body = entry
        .content
        .iter()
        .map(String::as_str)
        .find(|block| !block.trim().is_empty())
        .or_else(|| non_empty(entry.summary.as_deref()))
        .or_else(|| non_empty(entry.title.as_deref()))
        .unwrap_or("");

    let pub_date = entry
        .published_raw
        .clone()
        .or_else(|| entry.updated_raw.clone())
        .unwrap_or_default();

    CanonicalContent {
        title,
        link,
        guid,
        description,
        content: decode_entities(body),
        pub_date,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// Decodes `&lt;`, `&gt;` and then `&amp;`; nothing else.
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}
