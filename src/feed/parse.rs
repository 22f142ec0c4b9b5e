use chrono::{DateTime, Utc};
use rss::{Channel, Item};

use super::types::FeedEntry;

pub fn parse_channel(xml: &[u8]) -> Result<Channel, rss::Error> {
    Channel::read_from(xml)
}

pub fn entries(channel: &Channel) -> Vec<FeedEntry> {
    channel.items().iter().map(to_entry).collect()
}

fn to_entry(item: &Item) -> FeedEntry {
    let content = item.content().map(|c| vec![c.to_string()]).unwrap_or_default();
    FeedEntry {
        title: item.title().map(str::to_string),
        link: item.link().map(str::to_string),
        guid: item.guid().map(|g| g.value().to_string()),
        summary: item.description().map(str::to_string),
        content,
        published: extract_published_at(item),
        published_raw: item.pub_date().map(str::to_string),
        updated_raw: dc_date(item).map(str::to_string),
    }
}

fn dc_date(item: &Item) -> Option<&str> {
    item.dublin_core_ext()?.dates().first().map(String::as_str)
}

pub fn extract_published_at(item: &Item) -> Option<DateTime<Utc>> {
    if let Some(pub_date) = item.pub_date() {
        if let Ok(dt) = DateTime::parse_from_rfc2822(pub_date) { return Some(dt.with_timezone(&Utc)); }
    }
    // Dublin Core date (RFC3339)
    if let Some(first) = dc_date(item) {
        if let Ok(dt) = DateTime::parse_from_rfc3339(first) { return Some(dt.with_timezone(&Utc)); }
    }
    None
}
