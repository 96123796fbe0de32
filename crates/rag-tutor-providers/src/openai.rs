//! OpenAI HTTP client.
//!
//! One [`OpenAiClient`] serves all three backends: chat completions for the
//! summarizer, `/v1/audio/speech` for TTS, and the Assistants API
//! (see [`crate::assistants`]) for retrieval-augmented answers.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::{CompletionBackend, Credentials, SpeechBackend};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_RETRIEVAL_TOOL: &str = "file_search";

pub struct OpenAiClient {
    pub base_url: String,
    /// Tool type sent for retrieval-enabled runs.
    pub retrieval_tool: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            retrieval_tool: DEFAULT_RETRIEVAL_TOOL.to_string(),
            credentials,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_retrieval_tool(mut self, tool: impl Into<String>) -> Self {
        self.retrieval_tool = tool.into();
        self
    }

    /// Start a request against `path` (relative to `/v1`) with auth attached.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let Credentials::ApiKey { api_key } = &self.credentials;
        self.client
            .request(method, format!("{}/v1{path}", self.base_url))
            .header("authorization", format!("Bearer {api_key}"))
    }
}

/// Turn a non-success response into an error carrying the body.
pub(crate) async fn check_status(response: Response) -> anyhow::Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("OpenAI API error {status}: {body}");
}

// --- Chat completion types ---

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, model: &str, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        let body = ChatRequest {
            model: model.to_string(),
            messages: vec![
                json!({ "role": "system", "content": system_prompt }),
                json!({ "role": "user", "content": user_prompt }),
            ],
        };

        debug!(model, base_url = %self.base_url, "Requesting chat completion");

        let response = self
            .request(Method::POST, "/chat/completions")
            .json(&body)
            .send()
            .await?;
        let response: ChatResponse = check_status(response).await?.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("Chat completion returned no content"))
    }
}

#[async_trait]
impl SpeechBackend for OpenAiClient {
    async fn synthesize(&self, model: &str, voice: &str, text: &str) -> anyhow::Result<Bytes> {
        debug!(model, voice, chars = text.chars().count(), "Requesting speech synthesis");

        let response = self
            .request(Method::POST, "/audio/speech")
            .json(&json!({
                "model": model,
                "voice": voice,
                "input": text,
            }))
            .send()
            .await?;

        let audio = check_status(response).await?.bytes().await?;
        debug!(bytes = audio.len(), "Speech synthesized");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Credentials {
        Credentials::ApiKey {
            api_key: "sk-test".into(),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = OpenAiClient::new(None, key());
        assert_eq!(client.base_url, OPENAI_BASE_URL);
        assert_eq!(client.retrieval_tool, "file_search");
    }

    #[test]
    fn test_custom_base_url() {
        let client = OpenAiClient::new(Some("https://my-proxy.example.com/"), key());
        assert_eq!(client.base_url, "https://my-proxy.example.com");
    }

    #[test]
    fn test_retrieval_tool_override() {
        let client = OpenAiClient::new(None, key()).with_retrieval_tool("retrieval");
        assert_eq!(client.retrieval_tool, "retrieval");
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{"id":"chatcmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"Short summary."},"finish_reason":"stop"}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("Short summary."));
    }
}
