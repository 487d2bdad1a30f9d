//! OpenAI-compatible chat completions, pointed at OpenRouter by default.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    ChatMessage, Completion, CompletionOptions, LlmError, LlmProvider, TokenUsage,
    DEFAULT_BASE_URL,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for `{base_url}/chat/completions`.
///
/// `base_url` includes the version segment, e.g. `https://openrouter.ai/api/v1`.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            referer: None,
            title: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// App name sent as `X-Title`.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// App URL sent as `HTTP-Referer`.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: &'a [ChatMessage],
}

impl<'a> ChatRequest<'a> {
    fn new(messages: &'a [ChatMessage], options: &'a CompletionOptions) -> Self {
        Self {
            model: &options.model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl ChatResponse {
    fn into_completion(self, requested_model: &str) -> Result<Completion, LlmError> {
        let choice = self.choices.into_iter().next().ok_or(LlmError::EmptyChoices)?;
        let usage = self
            .usage
            .map(|u| TokenUsage {
                input: u.prompt_tokens,
                output: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            usage,
            finish_reason: choice.finish_reason,
        })
    }
}

fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        let mut request = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&ChatRequest::new(messages, options));
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            request = request.header("X-Title", title);
        }

        debug!(model = %options.model, messages = messages.len(), "sending completion request");
        let resp = request.send().await?;

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimited {
                retry_after_secs: retry_after(resp.headers()),
            }),
            status if !status.is_success() => Err(LlmError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }),
            _ => {
                let body = resp.text().await?;
                let parsed: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| LlmError::Decode(e.to_string()))?;
                parsed.into_completion(&options.model)
            }
        }
    }
}
