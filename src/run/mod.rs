use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;

use crate::analysis::settings::AnalysisSettings;
use crate::analysis::types::{AnalysisResult, Status, Theme};
use crate::analysis::{Analyzer, Outcome, RequestOptions};
use crate::feed::resolve;
use crate::feed::source::FeedSource;
use crate::feed::types::{DateRange, Resolution};
use crate::feed::SourceArgs;
use crate::llm::openai::{LlmClient, LlmClientConfig, OpenAiClient};
use crate::notify::email::EmailNotifier;
use crate::notify::{deliver, Notice, Notifier};
use crate::output::types::Meta;
use crate::render::{HtmlRenderer, RenderOutput, SiteConfig};
use crate::telemetry;
use crate::telemetry::ops::run::Phase as RunPhase;
use crate::util::time::DateArgs;

/// ai-daily run: fetch, match, analyze, render, notify
#[derive(Args, Debug)]
pub struct RunCmd {
    #[command(flatten)]
    date: DateArgs,
    #[command(flatten)]
    source: SourceArgs,
    /// Site directory (overrides AI_DAILY_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    max_tokens: Option<u32>,
    #[arg(long)]
    temperature: Option<f32>,
    /// Build the prompt and print a plan; no model call, no files, no mail
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    #[arg(long, default_value_t = false)]
    no_email: bool,
}

#[derive(Serialize)]
pub struct RunPlan {
    target_date: NaiveDate,
    origin: String,
    found: bool,
    available_range: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    content_chars: usize,
    model: String,
    page: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct RunResult {
    target_date: NaiveDate,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome>,
    theme: Theme,
    summary_count: usize,
    keyword_count: usize,
    item_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(flatten)]
    output: RenderOutput,
    notified: bool,
}

pub enum Report {
    Planned(RunPlan),
    Done(RunResult),
}

pub async fn run(args: RunCmd) -> Result<()> {
    let t0 = Instant::now();
    let log = telemetry::run();
    let _g = log
        .root_span_kv([
            ("date", format!("{:?}", args.date.date)),
            ("relative", format!("{:?}", args.date.relative)),
            ("source", format!("{:?}", args.source)),
            ("output_dir", format!("{:?}", args.output_dir)),
            ("model", format!("{:?}", args.model)),
            ("max_tokens", format!("{:?}", args.max_tokens)),
            ("temperature", format!("{:?}", args.temperature)),
            ("dry_run", args.dry_run.to_string()),
            ("no_email", args.no_email.to_string()),
        ])
        .entered();

    let _s = log.span(&RunPhase::Prepare).entered();
    let target = args.date.resolve(Utc::now()).context("resolve target date")?;
    let mut site = SiteConfig::from_env();
    if let Some(dir) = &args.output_dir {
        site.output_dir = dir.clone();
    }
    let notifier = if args.no_email || args.dry_run {
        None
    } else {
        EmailNotifier::from_env(&site)
    };
    if notifier.is_none() && !args.dry_run {
        log.info("✉️  Mail notifications off");
    }
    let llm_cfg = LlmClientConfig::from_env();
    if llm_cfg.api_key.is_none() && !args.dry_run {
        log.warn("⚠️  LLM_API_KEY is not set; the analysis will fall back to the raw entry");
    }
    let client = OpenAiClient::new(llm_cfg).context("build LLM client")?;
    let model = args.model.clone().unwrap_or_else(|| client.config().default_model.clone());
    let renderer = HtmlRenderer::new(site);
    log.info(format!("📅 Target date: {target}"));
    drop(_s);

    let source = match args.source.build() {
        Ok(src) => src,
        Err(err) => {
            let err = anyhow::Error::new(err).context("prepare feed source");
            let notice = Notice::Failure { date: target, error: format!("{err:#}") };
            deliver(notifier.as_ref().map(|n| n as &dyn Notifier), &notice).await;
            return Err(err);
        }
    };

    let pipeline = Pipeline {
        source: source.as_ref(),
        client: &client,
        renderer: &renderer,
        notifier: notifier.as_ref().map(|n| n as &dyn Notifier),
        settings: AnalysisSettings::from_env(),
        options: RequestOptions { model: args.model.clone(), max_tokens: args.max_tokens, temperature: args.temperature },
        model,
        dry_run: args.dry_run,
    };

    match pipeline.execute(target, Utc::now()).await? {
        Report::Planned(plan) => {
            log.info(format!(
                "📝 Dry run: prompt {} chars for {} ({})",
                plan.prompt.as_deref().map(|p| p.chars().count()).unwrap_or(0),
                target,
                if plan.found { "entry found" } else { "no entry" }
            ));
            if telemetry::config::json_mode() {
                log.plan(&plan)?;
            }
        }
        Report::Done(result) => {
            log.info(format!("🏁 Done in {} ms", t0.elapsed().as_millis()));
            if telemetry::config::json_mode() {
                let meta = Meta {
                    duration_ms: Some(t0.elapsed().as_millis()),
                    run_id: std::env::var("GITHUB_RUN_ID").ok().filter(|id| !id.is_empty()),
                };
                log.result_with_meta(&result, Some(meta))?;
            }
        }
    }
    Ok(())
}

/// One run's collaborators. Everything after date resolution goes through here.
pub struct Pipeline<'a> {
    pub source: &'a dyn FeedSource,
    pub client: &'a dyn LlmClient,
    pub renderer: &'a HtmlRenderer,
    pub notifier: Option<&'a dyn Notifier>,
    pub settings: AnalysisSettings,
    pub options: RequestOptions,
    /// Model name reported in plans.
    pub model: String,
    pub dry_run: bool,
}

impl Pipeline<'_> {
    /// Runs the remaining phases. A terminating error sends a failure notice before it is returned.
    pub async fn execute(&self, target: NaiveDate, now: DateTime<Utc>) -> Result<Report> {
        match self.stages(target, now).await {
            Ok(report) => Ok(report),
            Err(err) => {
                telemetry::run().error(format!("❌ Run failed for {target}: {err:#}"));
                if !self.dry_run {
                    let notice = Notice::Failure { date: target, error: format!("{err:#}") };
                    deliver(self.notifier, &notice).await;
                }
                Err(err)
            }
        }
    }

    async fn stages(&self, target: NaiveDate, now: DateTime<Utc>) -> Result<Report> {
        let log = telemetry::run();

        let _s = log.span_kv(&RunPhase::FetchFeed, [("origin", self.source.origin())]).entered();
        let entries = self
            .source
            .fetch()
            .await
            .with_context(|| format!("fetch feed {}", self.source.origin()))?;
        log.info(format!("📡 {} entries from {}", entries.len(), self.source.origin()));
        drop(_s);

        let _s = log.span(&RunPhase::Resolve).entered();
        let available_range = resolve::date_range(&entries);
        let content = match resolve::find_by_date(&entries, target) {
            Resolution::Found(content) => {
                log.info_kv(
                    &format!("✅ Matched: {}", content.title),
                    [("link", content.link.clone()), ("chars", content.content.chars().count().to_string())],
                );
                Some(content)
            }
            Resolution::NotFound { target, range } => {
                log.warn(format!("📭 No entry for {target}; feed covers {range}"));
                None
            }
        };
        drop(_s);

        if self.dry_run {
            let _s = log.span(&RunPhase::Prompt).entered();
            let analyzer = Analyzer::new(self.client, self.settings.clone(), self.options.clone());
            return Ok(Report::Planned(RunPlan {
                target_date: target,
                origin: self.source.origin(),
                found: content.is_some(),
                available_range,
                title: content.as_ref().map(|c| c.title.clone()),
                link: content.as_ref().map(|c| c.link.clone()),
                content_chars: content.as_ref().map(|c| c.content.chars().count()).unwrap_or(0),
                model: self.model.clone(),
                page: self.renderer.config().page_path(target),
                prompt: content.as_ref().map(|c| analyzer.prompt(c, target)),
            }));
        }

        let Some(content) = content else {
            let reason = not_found_reason(target, &available_range);
            let output = self.render_empty(target, &reason, now)?;
            let notified = self.notify(&Notice::Empty { date: target, reason: reason.clone() }).await;
            let result = AnalysisResult::empty(target, Theme::Gray, reason);
            return Ok(Report::Done(summarize(&result, None, output, notified)));
        };

        let _s = log.span_kv(&RunPhase::CallLlm, [("model", self.model.clone())]).entered();
        let analyzer = Analyzer::new(self.client, self.settings.clone(), self.options.clone());
        let result = analyzer.analyze(&content, target).await;
        let outcome = Outcome::of(&result);
        let theme = match self.settings.theme(result.theme) {
            Some(spec) => format!("{} ({})", result.theme, spec.name),
            None => result.theme.to_string(),
        };
        log.analysis_summary(
            &theme,
            result.summary.len(),
            result.keywords.len(),
            result.categories.len(),
            result.item_count(),
        );
        match outcome {
            Outcome::Fallback => log.warn_kv(
                "⚠️  Model unavailable; page built from the raw entry",
                [("reason", result.fallback_reason.clone().unwrap_or_default())],
            ),
            Outcome::Unparsed => log.warn_kv(
                "⚠️  Model reply was not JSON; page built from defaults",
                [("parse_error", result.parse_error.clone().unwrap_or_default())],
            ),
            Outcome::Repaired => log.info(format!("🔧 Repaired reply: {}", result.repairs.join("; "))),
            Outcome::Analyzed | Outcome::NoContent => {}
        }
        drop(_s);

        let (output, notice) = match result.status {
            Status::Success => {
                let _s = log.span(&RunPhase::Render).entered();
                let output = self.renderer.render_daily(&result, now).context("render daily page")?;
                log.info(format!("🖼️  Wrote {} ({} archive entries)", output.page.display(), output.index_entries));
                (output, Notice::Success { date: result.date, summary_count: result.summary.len() })
            }
            Status::Empty => {
                let reason = result.reason.clone().unwrap_or_else(|| self.settings.empty_reason.clone());
                let output = self.render_empty(target, &reason, now)?;
                (output, Notice::Empty { date: target, reason })
            }
            Status::Error => {
                let reason = result.reason.clone().unwrap_or_else(|| "analysis reported an error".to_string());
                let output = self.render_empty(target, &reason, now)?;
                (output, Notice::Failure { date: target, error: reason })
            }
        };

        let notified = self.notify(&notice).await;
        Ok(Report::Done(summarize(&result, Some(outcome), output, notified)))
    }

    fn render_empty(&self, target: NaiveDate, reason: &str, now: DateTime<Utc>) -> Result<RenderOutput> {
        let log = telemetry::run();
        let _s = log.span(&RunPhase::Render).entered();
        let output = self.renderer.render_empty(target, reason, now).context("render empty page")?;
        log.info(format!("🖼️  Wrote empty page {}", output.page.display()));
        Ok(output)
    }

    async fn notify(&self, notice: &Notice) -> bool {
        let log = telemetry::run();
        let _s = log.span_kv(&RunPhase::Notify, [("kind", notice.kind().to_string())]).entered();
        deliver(self.notifier, notice).await
    }
}

fn not_found_reason(target: NaiveDate, range: &DateRange) -> String {
    if range.is_empty() {
        format!("no feed entry for {target}; the feed has no dated entries")
    } else {
        format!("no feed entry for {target}; the feed covers {range}")
    }
}

fn summarize(result: &AnalysisResult, outcome: Option<Outcome>, output: RenderOutput, notified: bool) -> RunResult {
    RunResult {
        target_date: result.date,
        status: result.status,
        outcome,
        theme: result.theme,
        summary_count: result.summary.len(),
        keyword_count: result.keywords.len(),
        item_count: result.item_count(),
        reason: result.reason.clone(),
        output,
        notified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::source::FileFeedSource;
    use crate::llm::openai::{LlmError, MockClient};
    use crate::notify::NotifyError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::path::Path;
    use std::sync::Mutex;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
<channel>
  <title>AI News</title>
  <link>https://news.smol.ai/</link>
  <description>daily</description>
  <item>
    <title>MedGemma 1.5 and a LangChain round</title>
    <link>https://news.smol.ai/issues/26-01-13-medgemma/</link>
    <guid>https://news.smol.ai/issues/26-01-13-medgemma/</guid>
    <description>quiet day</description>
    <content:encoded><![CDATA[<p>MedGemma 1.5 shipped; LangChain raised a round.</p>]]></content:encoded>
    <pubDate>Tue, 13 Jan 2026 23:00:00 GMT</pubDate>
  </item>
  <item>
    <title>Earlier news</title>
    <link>https://news.smol.ai/issues/26-01-12-earlier/</link>
    <description>older</description>
    <pubDate>Mon, 12 Jan 2026 23:00:00 GMT</pubDate>
  </item>
</channel>
</rss>"#;

    const REPLY: &str = r#"{"status":"success","date":"2026-01-13","theme":"green",
        "summary":["MedGemma 1.5 released","LangChain funding"],"keywords":["MedGemma"],
        "categories":[{"key":"model","name":"Model Releases","icon":"🤖","items":[{"title":"MedGemma 1.5","summary":"medical model","url":"https://example.com/m","tags":["health"]}]}]}"#;

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<Notice>>,
    }

    #[async_trait]
    impl Notifier for Recording {
        async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 14, 6, 0, 0).unwrap()
    }

    struct Fixture {
        dir: tempfile::TempDir,
        source: FileFeedSource,
        renderer: HtmlRenderer,
    }

    fn fixture(rss: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("feed.xml");
        std::fs::write(&feed, rss).unwrap();
        let site = SiteConfig { output_dir: dir.path().join("site"), pages_url: None };
        Fixture { source: FileFeedSource::new(feed), renderer: HtmlRenderer::new(site), dir }
    }

    fn pipeline<'a>(fx: &'a Fixture, client: &'a MockClient, rec: &'a Recording, dry_run: bool) -> Pipeline<'a> {
        Pipeline {
            source: &fx.source,
            client,
            renderer: &fx.renderer,
            notifier: Some(rec as &dyn Notifier),
            settings: AnalysisSettings::default(),
            options: RequestOptions::default(),
            model: "test-model".into(),
            dry_run,
        }
    }

    fn site(fx: &Fixture) -> &Path {
        fx.renderer.config().output_dir.as_path()
    }

    #[tokio::test]
    async fn successful_run_renders_and_notifies() {
        let fx = fixture(RSS);
        let client = MockClient::new();
        client.push_text(REPLY);
        let rec = Recording::default();

        let Report::Done(result) = pipeline(&fx, &client, &rec, false).execute(day(13), now()).await.unwrap() else {
            panic!("expected a finished run");
        };
        assert_eq!(result.status, Status::Success);
        assert_eq!(result.outcome, Some(Outcome::Analyzed));
        assert_eq!(result.theme, Theme::Green);
        assert_eq!(result.item_count, 1);
        assert!(result.notified);
        assert!(site(&fx).join("2026-01-13.html").exists());
        assert!(site(&fx).join("index.html").exists());
        assert_eq!(client.calls().len(), 1);
        assert_eq!(rec.sent.lock().unwrap().as_slice(), &[Notice::Success { date: day(13), summary_count: 2 }]);
    }

    #[tokio::test]
    async fn missing_date_renders_empty_page_without_model_call() {
        let fx = fixture(RSS);
        let client = MockClient::new();
        let rec = Recording::default();

        let Report::Done(result) = pipeline(&fx, &client, &rec, false).execute(day(10), now()).await.unwrap() else {
            panic!("expected a finished run");
        };
        assert_eq!(result.status, Status::Empty);
        assert!(client.calls().is_empty());
        assert!(site(&fx).join("2026-01-10.html").exists());
        assert!(!site(&fx).join(".index.json").exists());
        let sent = rec.sent.lock().unwrap();
        let Notice::Empty { reason, .. } = &sent[0] else { panic!("expected an empty notice") };
        assert!(reason.contains("2026-01-10"));
        assert!(reason.contains("2026-01-12..2026-01-13"));
    }

    #[tokio::test]
    async fn model_failure_still_produces_a_page() {
        let fx = fixture(RSS);
        let client = MockClient::new();
        client.push_response(Err(LlmError::Timeout));
        let rec = Recording::default();

        let Report::Done(result) = pipeline(&fx, &client, &rec, false).execute(day(13), now()).await.unwrap() else {
            panic!("expected a finished run");
        };
        assert_eq!(result.outcome, Some(Outcome::Fallback));
        assert_eq!(result.status, Status::Success);
        assert!(site(&fx).join("2026-01-13.html").exists());
        assert!(matches!(rec.sent.lock().unwrap()[0], Notice::Success { .. }));
    }

    #[tokio::test]
    async fn unreadable_feed_sends_failure_notice_and_errors() {
        let fx = fixture(RSS);
        let missing = FileFeedSource::new(fx.dir.path().join("nope.xml"));
        let client = MockClient::new();
        let rec = Recording::default();
        let mut p = pipeline(&fx, &client, &rec, false);
        p.source = &missing;

        let err = p.execute(day(13), now()).await.err().unwrap();
        assert!(format!("{err:#}").contains("nope.xml"));
        let sent = rec.sent.lock().unwrap();
        assert!(matches!(&sent[0], Notice::Failure { date, .. } if *date == day(13)));
    }

    #[tokio::test]
    async fn dry_run_plans_without_side_effects() {
        let fx = fixture(RSS);
        let client = MockClient::new();
        let rec = Recording::default();

        let Report::Planned(plan) = pipeline(&fx, &client, &rec, true).execute(day(13), now()).await.unwrap() else {
            panic!("expected a plan");
        };
        assert!(plan.found);
        assert!(plan.prompt.as_deref().unwrap().contains("MedGemma 1.5 shipped"));
        assert_eq!(plan.model, "test-model");
        assert!(client.calls().is_empty());
        assert!(rec.sent.lock().unwrap().is_empty());
        assert!(!site(&fx).exists());
    }

    #[test]
    fn not_found_reason_names_target_and_range() {
        let range = DateRange { min: Some(day(11)), max: Some(day(13)) };
        assert_eq!(
            not_found_reason(day(20), &range),
            "no feed entry for 2026-01-20; the feed covers 2026-01-11..2026-01-13"
        );
        assert!(not_found_reason(day(20), &DateRange::default()).contains("no dated entries"));
    }
}
