//! Scripted provider for tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{ChatMessage, Completion, CompletionOptions, LlmError, LlmProvider, TokenUsage};

/// One call seen by [`MockProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub options: CompletionOptions,
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Result<Completion, LlmError>>,
    requests: Vec<RecordedRequest>,
}

/// Answers each call with the next scripted reply and records the request.
/// Calls past the end of the script fail with [`LlmError::EmptyChoices`].
#[derive(Debug, Default)]
pub struct MockProvider {
    script: Mutex<Script>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completion(self, completion: Completion) -> Self {
        self.script().replies.push_back(Ok(completion));
        self
    }

    /// Queue a completion carrying only `text`.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_completion(Completion {
            text: text.into(),
            model: "mock-model".to_string(),
            usage: TokenUsage {
                input: 10,
                output: 5,
            },
            finish_reason: Some("stop".to_string()),
        })
    }

    pub fn with_error(self, error: LlmError) -> Self {
        self.script().replies.push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script().requests.len()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        let mut script = self.script();
        script.requests.push(RecordedRequest {
            messages: messages.to_vec(),
            options: options.clone(),
        });
        script
            .replies
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyChoices))
    }
}
