//! Generation orchestrator: prompt the model, validate the answer against
//! the configuration schema, and retry with the validation error until the
//! attempt budget runs out.

use std::sync::Arc;

use cs_core::config::LlmSettings;
use cs_core::manifest::Manifest;
use cs_core::schema::ConfigSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm::{ChatMessage, CompletionOptions, LlmError, LlmProvider, TokenUsage};
use crate::prompt::{build_system_prompt, correction_message};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Every attempt produced output that failed validation.
    #[error("failed to generate valid YAML after {attempts} attempts. Last error: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("no completion generated on attempt {attempt}")]
    EmptyCompletion { attempt: u32 },

    #[error(transparent)]
    Backend(#[from] LlmError),
}

// ---------------------------------------------------------------------------
// Settings & request/response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub model: String,
    pub max_attempts: u32,
    /// Temperature for every attempt after the first; the first uses 0.
    pub retry_temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&LlmSettings::default())
    }
}

impl From<&LlmSettings> for GenerationSettings {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            max_attempts: settings.max_attempts.max(1),
            retry_temperature: settings.retry_temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Inputs for rewriting one configuration file.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub current_content: &'a str,
    pub parser_code: &'a str,
    pub manifests: &'a [Manifest],
    /// Repository URL the file belongs to, named in the prompt.
    pub context_url: &'a str,
    pub instruction: &'a str,
}

/// Schema-valid YAML produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub text: String,
    /// Usage of the accepted response.
    pub usage: TokenUsage,
    /// Attempts consumed, including the successful one.
    pub attempts: u32,
    pub model: String,
}

// ---------------------------------------------------------------------------
// Attempt state
// ---------------------------------------------------------------------------

/// Per-attempt state of the retry loop.
#[derive(Debug, Clone, PartialEq)]
struct GenerationAttempt {
    number: u32,
    last_error: Option<String>,
}

impl GenerationAttempt {
    fn first() -> Self {
        Self {
            number: 1,
            last_error: None,
        }
    }

    fn next(&self, error: String) -> Self {
        Self {
            number: self.number + 1,
            last_error: Some(error),
        }
    }

    fn temperature(&self, settings: &GenerationSettings) -> f32 {
        if self.number > 1 {
            settings.retry_temperature
        } else {
            0.0
        }
    }

    fn messages(&self, system_prompt: &str, instruction: &str) -> Vec<ChatMessage> {
        let mut messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(instruction),
        ];
        if let Some(error) = &self.last_error {
            messages.push(ChatMessage::user(correction_message(error)));
        }
        messages
    }
}

/// Models sometimes wrap their answer in a fenced block despite the prompt.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (`yaml`, `yml`, ...) on the opening line.
    match body.split_once('\n') {
        Some((_, content)) => content,
        None => body,
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

pub struct Generator {
    provider: Arc<dyn LlmProvider>,
    schema: Arc<ConfigSchema>,
    settings: GenerationSettings,
}

impl Generator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        schema: Arc<ConfigSchema>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            provider,
            schema,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Run the validate-and-retry loop for one file.
    ///
    /// Backend failures and empty completions end the loop immediately.
    /// Validation failures are fed back to the model until
    /// `max_attempts` is reached.
    pub async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GeneratedText, GenerationError> {
        let system_prompt = build_system_prompt(
            request.current_content,
            request.parser_code,
            request.manifests,
            request.context_url,
        );
        let max_attempts = self.settings.max_attempts.max(1);
        let mut spent = TokenUsage::default();
        let mut attempt = GenerationAttempt::first();

        loop {
            let options = CompletionOptions {
                model: self.settings.model.clone(),
                max_tokens: self.settings.max_tokens,
                temperature: attempt.temperature(&self.settings),
            };
            let messages = attempt.messages(&system_prompt, request.instruction);

            debug!(
                attempt = attempt.number,
                temperature = options.temperature,
                "requesting completion"
            );
            let response = self.provider.complete(&messages, &options).await?;
            spent += response.usage;

            let completion = strip_code_fence(&response.text);
            if completion.trim().is_empty() {
                return Err(GenerationError::EmptyCompletion {
                    attempt: attempt.number,
                });
            }

            let validation = self.schema.validate_yaml(completion);
            if validation.is_valid() {
                info!(
                    attempts = attempt.number,
                    total_tokens = spent.total(),
                    "generated valid configuration"
                );
                let text = completion.to_string();
                return Ok(GeneratedText {
                    text,
                    usage: response.usage,
                    attempts: attempt.number,
                    model: response.model,
                });
            }

            let error = validation.error.unwrap_or_default();
            warn!(
                attempt = attempt.number,
                max_attempts,
                error = %error,
                "invalid YAML generated"
            );

            if attempt.number >= max_attempts {
                return Err(GenerationError::Exhausted {
                    attempts: attempt.number,
                    last_error: error,
                });
            }
            attempt = attempt.next(error);
        }
    }
}
