use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::feed::date::parse_target_date;

use super::settings::AnalysisSettings;
use super::types::{AnalysisResult, Category, Item, Status, Theme};

const MAX_SUMMARY: usize = 5;

/// Turns whatever the model replied into a well-formed `AnalysisResult`. Never fails.
pub struct ResponseParser<'a> {
    settings: &'a AnalysisSettings,
}

impl<'a> ResponseParser<'a> {
    pub fn new(settings: &'a AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn parse(&self, raw: &str, target: NaiveDate) -> AnalysisResult {
        let text = strip_fences(raw);
        match decode(text) {
            Ok(Value::Object(map)) => self.repair(&map, target),
            Ok(other) => self.undecodable(target, format!("expected a JSON object, found {}", kind(&other))),
            Err(err) => self.undecodable(target, err.to_string()),
        }
    }

    fn undecodable(&self, target: NaiveDate, error: String) -> AnalysisResult {
        tracing::debug!(%error, "model reply is not a JSON object");
        let mut r = AnalysisResult::new(target, self.settings.default_theme);
        r.summary = vec![self.settings.acquired_notice.clone()];
        r.keywords = vec!["AI".to_string()];
        r.parse_error = Some(error);
        r
    }

    fn repair(&self, map: &Map<String, Value>, target: NaiveDate) -> AnalysisResult {
        let mut notes = Vec::new();
        let mut r = AnalysisResult::new(target, self.settings.default_theme);

        r.status = match map.get("status") {
            Some(Value::String(s)) => Status::parse(s).unwrap_or_else(|| {
                notes.push(format!("unknown status '{s}', using success"));
                Status::Success
            }),
            Some(v) => {
                notes.push(format!("status is {}, using success", kind(v)));
                Status::Success
            }
            None => {
                notes.push("status missing, using success".to_string());
                Status::Success
            }
        };

        r.date = match map.get("date") {
            Some(Value::String(s)) => parse_target_date(s).unwrap_or_else(|_| {
                notes.push(format!("invalid date '{s}', using {target}"));
                target
            }),
            Some(v) => {
                notes.push(format!("date is {}, using {target}", kind(v)));
                target
            }
            None => {
                notes.push(format!("date missing, using {target}"));
                target
            }
        };

        let default_theme = self.settings.default_theme;
        r.theme = match map.get("theme") {
            Some(Value::String(s)) => Theme::parse(s).unwrap_or_else(|| {
                notes.push(format!("unknown theme '{s}', using {default_theme}"));
                default_theme
            }),
            Some(v) => {
                notes.push(format!("theme is {}, using {default_theme}", kind(v)));
                default_theme
            }
            None => {
                notes.push(format!("theme missing, using {default_theme}"));
                default_theme
            }
        };

        let mut summary = string_list(pick(map, "summary", "highlights", &mut notes), "summary", &mut notes);
        if summary.len() > MAX_SUMMARY {
            notes.push(format!("summary had {} points, kept {MAX_SUMMARY}", summary.len()));
            summary.truncate(MAX_SUMMARY);
        }
        r.summary = summary;

        let keywords = string_list(pick(map, "keywords", "tags", &mut notes), "keywords", &mut notes);
        let before = keywords.len();
        r.keywords = dedup(keywords);
        if r.keywords.len() < before {
            notes.push(format!("dropped {} duplicate keywords", before - r.keywords.len()));
        }

        r.categories = match pick(map, "categories", "sections", &mut notes) {
            Some(Value::Array(list)) => list
                .iter()
                .enumerate()
                .filter_map(|(i, v)| self.category(i, v, &mut notes))
                .collect(),
            Some(v) => {
                notes.push(format!("categories is {}, using []", kind(v)));
                Vec::new()
            }
            None => {
                notes.push("categories missing, using []".to_string());
                Vec::new()
            }
        };

        if let Some(Value::String(reason)) = map.get("reason") {
            r.reason = Some(reason.clone());
        }

        if !notes.is_empty() {
            tracing::debug!(repairs = notes.len(), "model reply repaired");
        }
        r.repairs = notes;
        r
    }

    fn category(&self, idx: usize, v: &Value, notes: &mut Vec<String>) -> Option<Category> {
        let Value::Object(obj) = v else {
            notes.push(format!("categories[{idx}] is {}, dropped", kind(v)));
            return None;
        };
        let key = match text(obj.get("key")) {
            Some(k) => k.to_string(),
            None => {
                let k = self.settings.categories.first().map_or("tools", |c| c.key);
                notes.push(format!("categories[{idx}].key missing, using '{k}'"));
                k.to_string()
            }
        };
        let known = self.settings.category(&key);
        if known.is_none() {
            notes.push(format!("categories[{idx}].key '{key}' is not a known category"));
        }

        // supplied strings are kept as-is, even when empty
        let name = match (obj.get("name"), known) {
            (Some(Value::String(n)), _) => n.clone(),
            (_, Some(spec)) => {
                notes.push(format!("categories[{idx}].name filled from '{key}'"));
                spec.name.to_string()
            }
            (_, None) => {
                notes.push(format!("categories[{idx}].name missing, using key"));
                key.clone()
            }
        };
        let icon = match (obj.get("icon"), known) {
            (Some(Value::String(i)), _) => i.clone(),
            (_, Some(spec)) => {
                notes.push(format!("categories[{idx}].icon filled from '{key}'"));
                spec.icon.to_string()
            }
            (_, None) => String::new(),
        };

        let items = match obj.get("items") {
            Some(Value::Array(list)) => list
                .iter()
                .enumerate()
                .filter_map(|(j, v)| item(idx, j, v, notes))
                .collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                notes.push(format!("categories[{idx}].items is {}, using []", kind(other)));
                Vec::new()
            }
        };

        Some(Category { key, name, icon, items })
    }
}

fn item(cat: usize, idx: usize, v: &Value, notes: &mut Vec<String>) -> Option<Item> {
    let Value::Object(obj) = v else {
        notes.push(format!("categories[{cat}].items[{idx}] is {}, dropped", kind(v)));
        return None;
    };
    let summary = str_or(obj, "summary", "description");
    let url = str_or(obj, "url", "link");
    let title = match text(obj.get("title")) {
        Some(t) => t.to_string(),
        None => {
            let (fill, from) = if !summary.trim().is_empty() {
                (summary, "summary")
            } else if !url.trim().is_empty() {
                (url, "url")
            } else {
                ("", "\"\"")
            };
            notes.push(format!("categories[{cat}].items[{idx}].title missing, using {from}"));
            fill.to_string()
        }
    };
    let tags = match obj.get("tags") {
        Some(Value::Array(list)) => {
            let tags: Vec<String> = list.iter().filter_map(Value::as_str).map(str::to_string).collect();
            if tags.len() < list.len() {
                notes.push(format!("dropped {} non-text categories[{cat}].items[{idx}].tags entries", list.len() - tags.len()));
            }
            tags
        }
        _ => Vec::new(),
    };
    Some(Item { title, summary: summary.to_string(), url: url.to_string(), tags })
}

fn str_or<'m>(obj: &'m Map<String, Value>, key: &str, alias: &str) -> &'m str {
    obj.get(key).and_then(Value::as_str).or_else(|| obj.get(alias).and_then(Value::as_str)).unwrap_or_default()
}

/// Canonical key first, then its alternate spelling.
fn pick<'m>(map: &'m Map<String, Value>, key: &str, alias: &str, notes: &mut Vec<String>) -> Option<&'m Value> {
    if let Some(v) = map.get(key) {
        return Some(v);
    }
    let v = map.get(alias)?;
    notes.push(format!("used '{alias}' for '{key}'"));
    Some(v)
}

fn string_list(v: Option<&Value>, field: &str, notes: &mut Vec<String>) -> Vec<String> {
    match v {
        Some(Value::Array(list)) => {
            let out: Vec<String> = list
                .iter()
                .filter_map(|x| text(Some(x)))
                .map(str::to_string)
                .collect();
            if out.len() < list.len() {
                notes.push(format!("dropped {} blank or non-text {field} entries", list.len() - out.len()));
            }
            out
        }
        Some(Value::String(s)) if !s.trim().is_empty() => {
            notes.push(format!("{field} was a single string"));
            vec![s.clone()]
        }
        Some(other) => {
            notes.push(format!("{field} is {}, using []", kind(other)));
            Vec::new()
        }
        None => {
            notes.push(format!("{field} missing, using []"));
            Vec::new()
        }
    }
}

fn dedup(list: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(list.len());
    for s in list {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

/// A string value that is not blank, returned untrimmed.
fn text(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Removes one surrounding Markdown code fence, with or without a language tag.
pub fn strip_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        let tag_len = rest.find(|c: char| !c.is_ascii_alphanumeric()).unwrap_or(rest.len());
        s = &rest[tag_len..];
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Strict JSON, then the outermost `{ ... }` span when prose surrounds it.
fn decode(text: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str::<Value>(text) {
        Ok(v) => Ok(v),
        Err(err) => {
            let span = match (text.find('{'), text.rfind('}')) {
                (Some(start), Some(end)) if end > start => &text[start..=end],
                _ => return Err(err),
            };
            if span.len() == text.len() {
                return Err(err);
            }
            serde_json::from_str::<Value>(span).map_err(|_| err)
        }
    }
}
