//! Speech synthesis with a process-lifetime cache.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

use rag_tutor_core::config::Config;
use rag_tutor_providers::SpeechBackend;

/// Shown when there is no answer worth reading aloud yet.
pub const ASK_FIRST_MESSAGE: &str = "Please ask a question first!";

/// Cache key: identical inputs always map to the same audio.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpeechKey {
    pub model: String,
    pub voice: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    Audio(Bytes),
    AskFirst,
}

pub struct SpeechSynthesizer {
    backend: Arc<dyn SpeechBackend>,
    model: String,
    voice: String,
    min_chars: usize,
    cache: Arc<RwLock<HashMap<SpeechKey, Bytes>>>,
}

impl SpeechSynthesizer {
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        model: impl Into<String>,
        voice: impl Into<String>,
        min_chars: usize,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            voice: voice.into(),
            min_chars,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(backend: Arc<dyn SpeechBackend>, config: &Config) -> Self {
        Self::new(
            backend,
            config.tts_model(),
            config.tts_voice(),
            config.tts_min_chars(),
        )
    }

    /// Synthesize `text`, reusing cached audio for identical inputs.
    pub async fn synthesize(&self, model: &str, voice: &str, text: &str) -> anyhow::Result<Bytes> {
        let key = SpeechKey {
            model: model.to_string(),
            voice: voice.to_string(),
            text: text.to_string(),
        };

        if let Some(audio) = self.cache.read().await.get(&key) {
            debug!(model, voice, "Speech cache hit");
            return Ok(audio.clone());
        }

        let audio = self
            .backend
            .synthesize(model, voice, text)
            .await
            .context("Speech synthesis failed")?;

        let mut cache = self.cache.write().await;
        let audio = cache.entry(key).or_insert(audio).clone();
        debug!(model, voice, bytes = audio.len(), cached = cache.len(), "Speech cached");
        Ok(audio)
    }

    /// Whether `text` is long enough to be worth synthesizing.
    pub fn accepts(&self, text: &str) -> bool {
        text.chars().count() > self.min_chars
    }

    /// Read the current response aloud with the configured model and voice.
    pub async fn listen(&self, current_response: &str) -> anyhow::Result<ListenOutcome> {
        if !self.accepts(current_response) {
            return Ok(ListenOutcome::AskFirst);
        }
        let audio = self.synthesize(&self.model, &self.voice, current_response).await?;
        Ok(ListenOutcome::Audio(audio))
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.read().await.len()
    }
}
