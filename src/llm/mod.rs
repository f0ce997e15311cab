//! LLM access for contract analysis.
//!
//! Supports Gemini (default), OpenAI-compatible APIs and a local Ollama.
//! Every call is a single blocking request/response: no streaming and no
//! retries.

mod client;
mod config;

use async_trait::async_trait;
use thiserror::Error;

pub use client::LlmClient;
pub use config::{LlmConfig, LlmProvider};

/// Anything that can turn a prompt into a completion.
///
/// Implemented by [`LlmClient`]; tests substitute a scripted stub.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to decode the provider envelope
    #[error("Parse error: {0}")]
    Parse(String),
    /// Provider answered without any text
    #[error("Model returned an empty response")]
    EmptyResponse,
    /// Hosted provider configured without a key
    #[error("No API key configured for provider '{0}'")]
    MissingApiKey(&'static str),
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replays canned replies in order and counts calls.
    #[derive(Default)]
    pub(crate) struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_reply(self, reply: &str) -> Self {
            self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
            self
        }

        pub(crate) fn with_error(self, error: LlmError) -> Self {
            self.replies.lock().unwrap().push_back(Err(error));
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Api("no scripted reply left".to_string())))
        }
    }
}
