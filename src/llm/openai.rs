use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::extract::model_text;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_ENDPOINT: &str = "/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct LlmClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub endpoint: String,
    pub default_model: String,
    pub default_max_tokens: u32,
    pub default_temperature: f32,
    pub timeout: Duration,
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            default_temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl LlmClientConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.api_key = std::env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());
        if let Ok(base) = std::env::var("LLM_BASE_URL") {
            cfg.base_url = base;
        }
        if let Ok(endpoint) = std::env::var("LLM_API_ENDPOINT") {
            cfg.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            cfg.default_model = model;
        }
        if let Ok(max) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(parsed) = max.parse::<u32>() {
                cfg.default_max_tokens = parsed;
            }
        }
        if let Ok(temp) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(parsed) = temp.parse::<f32>() {
                cfg.default_temperature = parsed;
            }
        }
        if let Ok(timeout) = std::env::var("LLM_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        cfg
    }

    /// `base_url` joined with `endpoint`, with exactly one slash between them.
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

/// OpenAI-compatible chat-completions client; also speaks to proxies that answer
/// in other vendor shapes (see `extract::model_text`).
#[derive(Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    cfg: LlmClientConfig,
}

impl OpenAiClient {
    pub fn new(cfg: LlmClientConfig) -> Result<Self, LlmError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(LlmError::http)?;
        Ok(Self { http, cfg })
    }

    pub fn config(&self) -> &LlmClientConfig {
        &self.cfg
    }

    fn build_api_request(&self, req: &ChatCompletionRequest) -> ApiChatCompletionRequest {
        ApiChatCompletionRequest {
            model: req.model.clone().unwrap_or_else(|| self.cfg.default_model.clone()),
            max_tokens: req.max_tokens.unwrap_or(self.cfg.default_max_tokens),
            temperature: req.temperature.unwrap_or(self.cfg.default_temperature),
            messages: req
                .messages
                .iter()
                .map(|m| ApiChatMessage {
                    role: m.role.as_api_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError>;
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::EmptyMessages);
        }
        let api_key = self.cfg.api_key.clone().ok_or(LlmError::MissingApiKey)?;
        let api_request = self.build_api_request(&request);
        let url = self.cfg.url();
        tracing::debug!(%url, model = %api_request.model, "chat completion request");

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(LlmError::http)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(LlmError::http)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).chars().take(200).collect());
            return Err(LlmError::Api { status, message });
        }

        let raw: Value = serde_json::from_slice(&bytes).map_err(LlmError::Decode)?;
        let content = model_text(&raw);
        let usage = raw.get("usage").map(|u| UsageMetrics {
            prompt_tokens: token_count(u, "prompt_tokens", "input_tokens"),
            completion_tokens: token_count(u, "completion_tokens", "output_tokens"),
        });

        Ok(ChatCompletionResponse { content, raw, usage })
    }
}

fn token_count(usage: &Value, openai: &str, anthropic: &str) -> Option<u32> {
    usage
        .get(openai)
        .or_else(|| usage.get(anthropic))
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChatRole {
    User,
}

impl ChatRole {
    fn as_api_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
        }
    }
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatCompletionResponse {
    pub content: String,
    pub raw: Value,
    pub usage: Option<UsageMetrics>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UsageMetrics {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

#[derive(Debug)]
pub enum LlmError {
    MissingApiKey,
    EmptyMessages,
    Http(reqwest::Error),
    Timeout,
    Api { status: StatusCode, message: String },
    #[cfg(test)]
    MockQueueEmpty,
    Decode(serde_json::Error),
}

impl LlmError {
    fn http(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(err)
        }
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::MissingApiKey => write!(f, "LLM_API_KEY is not set"),
            LlmError::EmptyMessages => {
                write!(f, "chat completion requires at least one message")
            }
            LlmError::Http(err) => write!(f, "http error: {err}"),
            LlmError::Timeout => write!(f, "request timed out"),
            LlmError::Api { status, message } => write!(f, "api error {status}: {message}"),
            #[cfg(test)]
            LlmError::MockQueueEmpty => write!(f, "mock client response queue is empty"),
            LlmError::Decode(err) => write!(f, "response is not valid JSON: {err}"),
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::Http(err) => Some(err),
            LlmError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ApiChatCompletionRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ApiChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct ApiChatMessage {
    role: String,
    content: String,
}

#[cfg(test)]
pub use mock::MockClient;
