//! Summarizer client: condenses transcript text through the completion backend.

use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use rag_tutor_core::config::Config;
use rag_tutor_providers::CompletionBackend;

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const SUMMARY_PROMPT_PREFIX: &str = "Please summarize the following text capturing topics covered: ";

/// User prompt sent for `text`.
pub fn summary_prompt(text: &str) -> String {
    format!("{SUMMARY_PROMPT_PREFIX}{text}")
}

pub struct Summarizer {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn from_config(backend: Arc<dyn CompletionBackend>, config: &Config) -> Self {
        Self::new(backend, config.summarizer_model())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One completion round-trip. No retry; the output is returned as-is.
    pub async fn summarize(&self, text: &str) -> anyhow::Result<String> {
        debug!(model = %self.model, words = text.split_whitespace().count(), "Summarizing");
        self.backend
            .complete(&self.model, SUMMARY_SYSTEM_PROMPT, &summary_prompt(text))
            .await
            .context("Summarization failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt() {
        assert_eq!(
            summary_prompt("a b c"),
            "Please summarize the following text capturing topics covered: a b c"
        );
    }
}
