//! Backend abstraction.
//!
//! Three collaborators sit behind traits so the agent runtime can be driven by
//! real HTTP clients or by in-memory fakes:
//! - [`AssistantBackend`]: hosted assistant threads, runs, messages and files
//! - [`CompletionBackend`]: single-shot text completion
//! - [`SpeechBackend`]: text-to-speech synthesis

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use rag_tutor_core::types::RunStatus;

pub mod assistants;
pub mod openai;

/// Credentials for authenticating with a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Credentials {
    #[serde(rename = "api_key")]
    ApiKey { api_key: String },
}

/// Parameters for starting a run on a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub assistant_id: String,
    pub instructions: String,
    /// Enable file-backed retrieval for this run.
    pub retrieval: bool,
}

/// Point-in-time view of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub id: String,
    pub status: RunStatus,
    /// Backend-provided reason when the run ended in failure.
    pub last_error: Option<String>,
}

/// Role of a message in a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message listed from a thread. Only text content is retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: Vec<MessageText>,
}

impl ThreadMessage {
    /// First text block, which carries the answer and its annotations.
    pub fn first_text(&self) -> Option<&MessageText> {
        self.content.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText {
    pub value: String,
    pub annotations: Vec<Annotation>,
}

/// Citation metadata attached to a span of assistant text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// The span quotes a retrieved file.
    FileCitation {
        text: String,
        file_id: String,
        quote: String,
    },
    /// The span links to a generated file.
    FilePath { text: String, file_id: String },
    /// Any annotation kind this application does not interpret.
    Unknown { text: String },
}

impl Annotation {
    /// Literal substring of the message text this annotation marks.
    pub fn text(&self) -> &str {
        match self {
            Self::FileCitation { text, .. } | Self::FilePath { text, .. } | Self::Unknown { text } => {
                text
            }
        }
    }
}

/// Stored file metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub filename: String,
}

/// Hosted assistant with file-backed retrieval.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Create a fresh session context (thread) and return its id.
    async fn create_thread(&self) -> anyhow::Result<String>;

    /// Attach user input text to a thread.
    async fn add_user_message(&self, thread_id: &str, text: &str) -> anyhow::Result<()>;

    /// Start a processing run on a thread.
    async fn create_run(&self, thread_id: &str, request: &RunRequest) -> anyhow::Result<RunSnapshot>;

    /// Fetch the current status of a run.
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> anyhow::Result<RunSnapshot>;

    /// List messages of a thread, oldest first.
    async fn list_messages(&self, thread_id: &str) -> anyhow::Result<Vec<ThreadMessage>>;

    /// Look up stored file metadata by id.
    async fn retrieve_file(&self, file_id: &str) -> anyhow::Result<FileInfo>;
}

/// Single-shot text completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, model: &str, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String>;
}

/// Text-to-speech synthesis.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, model: &str, voice: &str, text: &str) -> anyhow::Result<Bytes>;
}
