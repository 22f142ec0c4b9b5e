use chrono::NaiveDate;

use crate::feed::types::CanonicalContent;
use crate::llm::openai::{ChatCompletionRequest, ChatMessage, ChatRole, LlmClient};

pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod settings;
pub mod types;

use fallback::FallbackPolicy;
use parse::ResponseParser;
use prompt::PromptBuilder;
use settings::AnalysisSettings;
use types::AnalysisResult;

/// Per-run overrides of the client defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// How the result was obtained, for logs and the run envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Analyzed,
    Repaired,
    Unparsed,
    Fallback,
    NoContent,
}

impl Outcome {
    pub fn of(result: &AnalysisResult) -> Self {
        if result.fallback_reason.is_some() {
            Outcome::Fallback
        } else if result.parse_error.is_some() {
            Outcome::Unparsed
        } else if result.reason.is_some() && result.status == types::Status::Empty {
            Outcome::NoContent
        } else if !result.repairs.is_empty() {
            Outcome::Repaired
        } else {
            Outcome::Analyzed
        }
    }
}

/// One analysis call per run: prompt, model, then parser or fallback. Always yields a result.
pub struct Analyzer<'c, C: LlmClient + ?Sized> {
    client: &'c C,
    settings: AnalysisSettings,
    options: RequestOptions,
}

impl<'c, C: LlmClient + ?Sized> Analyzer<'c, C> {
    pub fn new(client: &'c C, settings: AnalysisSettings, options: RequestOptions) -> Self {
        Self { client, settings, options }
    }

    pub fn prompt(&self, content: &CanonicalContent, target: NaiveDate) -> String {
        PromptBuilder::new(&self.settings).build(content, target)
    }

    pub async fn analyze(&self, content: &CanonicalContent, target: NaiveDate) -> AnalysisResult {
        if content.content.trim().is_empty() {
            return AnalysisResult::empty(target, self.settings.default_theme, self.settings.empty_reason.clone());
        }

        let request = ChatCompletionRequest {
            model: self.options.model.clone(),
            messages: vec![ChatMessage::new(ChatRole::User, self.prompt(content, target))],
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };

        match self.client.chat_completion(request).await {
            Ok(resp) => {
                let served_by = resp.raw.get("model").and_then(serde_json::Value::as_str).unwrap_or("unknown");
                let usage = resp.usage.as_ref();
                tracing::debug!(
                    model = served_by,
                    chars = resp.content.chars().count(),
                    prompt_tokens = ?usage.and_then(|u| u.prompt_tokens),
                    completion_tokens = ?usage.and_then(|u| u.completion_tokens),
                    "model replied"
                );
                ResponseParser::new(&self.settings).parse(&resp.content, target)
            }
            Err(err) => {
                tracing::warn!(error = %err, "analysis call failed, using fallback result");
                FallbackPolicy::new(&self.settings).on_transport_failure(content, target, &err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::openai::{LlmError, MockClient};
    use super::types::{Status, Theme};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()
    }

    fn content() -> CanonicalContent {
        CanonicalContent {
            title: "not much happened today".into(),
            link: "https://news.smol.ai/issues/26-01-13-not-much/".into(),
            guid: "https://news.smol.ai/issues/26-01-13-not-much/".into(),
            description: "quiet day".into(),
            content: "MedGemma 1.5 shipped; LangChain raised a round.".into(),
            pub_date: String::new(),
        }
    }

    #[tokio::test]
    async fn success_path_parses_model_reply() {
        let mock = MockClient::new();
        mock.push_text("```json\n{\"status\":\"success\",\"date\":\"2026-01-13\",\"theme\":\"teal\",\"summary\":[\"LangChain raised\"],\"keywords\":[\"LangChain\"],\"categories\":[]}\n```");
        let options = RequestOptions { model: Some("kimi-k2".into()), max_tokens: Some(2000), temperature: None };
        let analyzer = Analyzer::new(&mock, AnalysisSettings::default(), options);

        let r = analyzer.analyze(&content(), day()).await;
        assert_eq!(r.theme, Theme::Teal);
        assert_eq!(r.summary, vec!["LangChain raised".to_string()]);
        assert_eq!(Outcome::of(&r), Outcome::Analyzed);

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model.as_deref(), Some("kimi-k2"));
        assert_eq!(calls[0].max_tokens, Some(2000));
        assert!(calls[0].messages[0].content.contains("MedGemma 1.5 shipped"));
    }

    #[tokio::test]
    async fn transport_error_uses_fallback() {
        let mock = MockClient::new();
        mock.push_response(Err(LlmError::Timeout));
        let analyzer = Analyzer::new(&mock, AnalysisSettings::default(), RequestOptions::default());

        let r = analyzer.analyze(&content(), day()).await;
        assert_eq!(r.status, Status::Success);
        assert_eq!(r.keywords, vec!["AI", "News"]);
        assert_eq!(r.fallback_reason.as_deref(), Some("request timed out"));
        assert_eq!(Outcome::of(&r), Outcome::Fallback);
    }

    #[tokio::test]
    async fn empty_content_skips_the_model() {
        let mock = MockClient::new();
        let analyzer = Analyzer::new(&mock, AnalysisSettings::default(), RequestOptions::default());
        let blank = CanonicalContent { content: "   ".into(), ..content() };

        let r = analyzer.analyze(&blank, day()).await;
        assert_eq!(r.status, Status::Empty);
        assert_eq!(r.reason.as_deref(), Some("content empty"));
        assert!(mock.calls().is_empty());
        assert_eq!(Outcome::of(&r), Outcome::NoContent);
    }

    #[tokio::test]
    async fn garbage_reply_is_unparsed_not_fatal() {
        let mock = MockClient::new();
        mock.push_text("I'm sorry, I can't do that.");
        let analyzer = Analyzer::new(&mock, AnalysisSettings::default(), RequestOptions::default());
        let r = analyzer.analyze(&content(), day()).await;
        assert_eq!(Outcome::of(&r), Outcome::Unparsed);
        assert_eq!(r.summary, vec!["AI news retrieved".to_string()]);
    }
}
