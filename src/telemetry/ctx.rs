use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{Level, Span};

use crate::output::config::OutputConfig;
use crate::output::types::{Envelope, Meta};
use crate::output::Emitter;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

/// Typed logging handle for one command. `json` mirrors `AI_DAILY_LOG_FORMAT=json`:
/// structured logs carry the op name and key/value details, text logs only the message.
pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        self.event(Level::INFO, None, "start", kv_to_string(fields));
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        self.event(Level::INFO, Some(ph.name()), "span_start", kv_to_string(fields));
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { self.event(Level::INFO, None, msg.as_ref(), String::new()); }
    pub fn warn(&self, msg: impl AsRef<str>) { self.event(Level::WARN, None, msg.as_ref(), String::new()); }
    pub fn error(&self, msg: impl AsRef<str>) { self.event(Level::ERROR, None, msg.as_ref(), String::new()); }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        self.event(Level::INFO, None, msg, kv_to_string(kv));
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        self.event(Level::WARN, None, msg, kv_to_string(kv));
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> {
        emit(&Envelope::plan(O::NAME, plan, None)?)
    }

    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> {
        self.result_with_meta(result, None)
    }

    pub fn result_with_meta<T: Serialize>(&self, result: &T, meta: Option<Meta>) -> Result<()> {
        emit(&Envelope::result(O::NAME, result, meta)?)
    }

    fn event(&self, level: Level, phase: Option<&'static str>, msg: &str, details: String) {
        let (op, json) = (O::NAME, self.json);
        let phase = phase.unwrap_or("");
        // text mode keeps the message and the phase marker only
        macro_rules! at {
            ($lvl:expr) => {
                if !json {
                    if phase.is_empty() {
                        tracing::event!($lvl, "{}", msg);
                    } else {
                        tracing::event!($lvl, op, phase, "{}", msg);
                    }
                } else if details.is_empty() {
                    tracing::event!($lvl, op, phase, "{}", msg);
                } else {
                    tracing::event!($lvl, op, phase, details = %details, "{}", msg);
                }
            };
        }
        if level == Level::ERROR {
            at!(Level::ERROR)
        } else if level == Level::WARN {
            at!(Level::WARN)
        } else {
            at!(Level::INFO)
        }
    }
}

impl LogCtx<crate::telemetry::ops::run::Run> {
    pub fn analysis_summary(&self, theme: &str, summary: usize, keywords: usize, categories: usize, items: usize) {
        if self.json {
            tracing::info!(op = "run", theme, summary, keywords, categories, items, "analysis_summary");
        } else {
            tracing::info!("✅ Analysis: theme={} summary={} keywords={} categories={} items={}", theme, summary, keywords, categories, items);
        }
    }
}

fn emit(env: &Envelope) -> Result<()> {
    Emitter::from_env(OutputConfig::from_env()).emit(env)?;
    Ok(())
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    kv.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry;

    #[test]
    fn kv_to_string_joins_pairs_in_order() {
        let s = kv_to_string([("date", "2026-01-13".to_string()), ("dry_run", "false".to_string())]);
        assert_eq!(s, "date=2026-01-13 dry_run=false");
    }

    #[test]
    fn kv_to_string_empty_is_empty() {
        let s = kv_to_string(Vec::<(&str, String)>::new());
        assert!(s.is_empty());
    }

    #[test]
    fn logging_without_subscriber_is_harmless() {
        let log = telemetry::run();
        let _g = log.root_span_kv([("date", "2026-01-13".to_string())]).entered();
        log.info("hello");
        log.warn_kv("careful", [("k", "v".to_string())]);
        log.analysis_summary("blue", 3, 2, 1, 4);
    }
}
