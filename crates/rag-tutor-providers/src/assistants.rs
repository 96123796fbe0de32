//! OpenAI Assistants API (v2) threads, runs, messages and file lookups.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};

use rag_tutor_core::types::RunStatus;

use crate::openai::{OpenAiClient, check_status};
use crate::{
    Annotation, AssistantBackend, FileInfo, MessageRole, MessageText, RunRequest, RunSnapshot,
    ThreadMessage,
};

const ASSISTANTS_BETA: &str = "assistants=v2";

/// Map a wire run status onto the application's run lifecycle.
///
/// Unrecognized statuses count as still in progress so polling continues.
pub fn parse_run_status(status: &str) -> RunStatus {
    match status {
        "queued" => RunStatus::Queued,
        "completed" => RunStatus::Completed,
        "failed" | "cancelled" | "expired" | "incomplete" => RunStatus::Failed,
        "in_progress" | "requires_action" | "cancelling" => RunStatus::InProgress,
        other => {
            trace!(status = other, "Unrecognized run status");
            RunStatus::InProgress
        }
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<RunObject> for RunSnapshot {
    fn from(run: RunObject) -> Self {
        let last_error = run.last_error.map(|e| match (e.code, e.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => "unknown error".to_string(),
        });
        Self {
            status: parse_run_status(&run.status),
            id: run.id,
            last_error,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    id: String,
    role: MessageRole,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: TextPart },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    value: String,
    #[serde(default)]
    annotations: Vec<AnnotationObject>,
}

#[derive(Debug, Deserialize)]
struct AnnotationObject {
    #[serde(default)]
    text: String,
    #[serde(default)]
    file_citation: Option<FileRef>,
    #[serde(default)]
    file_path: Option<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    file_id: String,
    #[serde(default)]
    quote: Option<String>,
}

impl From<AnnotationObject> for Annotation {
    fn from(a: AnnotationObject) -> Self {
        if let Some(citation) = a.file_citation {
            Annotation::FileCitation {
                text: a.text,
                file_id: citation.file_id,
                quote: citation.quote.unwrap_or_default(),
            }
        } else if let Some(path) = a.file_path {
            Annotation::FilePath {
                text: a.text,
                file_id: path.file_id,
            }
        } else {
            Annotation::Unknown { text: a.text }
        }
    }
}

impl From<MessageObject> for ThreadMessage {
    fn from(m: MessageObject) -> Self {
        let content = m
            .content
            .into_iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(MessageText {
                    value: text.value,
                    annotations: text.annotations.into_iter().map(Annotation::from).collect(),
                }),
                ContentPart::Other => None,
            })
            .collect();
        Self {
            id: m.id,
            role: m.role,
            content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileObject {
    id: String,
    filename: String,
}

impl OpenAiClient {
    fn beta(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path).header("OpenAI-Beta", ASSISTANTS_BETA)
    }
}

#[async_trait]
impl AssistantBackend for OpenAiClient {
    async fn create_thread(&self) -> anyhow::Result<String> {
        let response = self.beta(Method::POST, "/threads").json(&json!({})).send().await?;
        let thread: ThreadObject = check_status(response).await?.json().await?;
        debug!(thread_id = %thread.id, "Created thread");
        Ok(thread.id)
    }

    async fn add_user_message(&self, thread_id: &str, text: &str) -> anyhow::Result<()> {
        let response = self
            .beta(Method::POST, &format!("/threads/{thread_id}/messages"))
            .json(&json!({ "role": "user", "content": text }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, request: &RunRequest) -> anyhow::Result<RunSnapshot> {
        let tools = if request.retrieval {
            vec![json!({ "type": self.retrieval_tool })]
        } else {
            Vec::new()
        };

        let response = self
            .beta(Method::POST, &format!("/threads/{thread_id}/runs"))
            .json(&json!({
                "assistant_id": request.assistant_id,
                "instructions": request.instructions,
                "tools": tools,
            }))
            .send()
            .await?;
        let run: RunObject = check_status(response).await?.json().await?;
        debug!(thread_id, run_id = %run.id, status = %run.status, "Created run");
        Ok(run.into())
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> anyhow::Result<RunSnapshot> {
        let response = self
            .beta(Method::GET, &format!("/threads/{thread_id}/runs/{run_id}"))
            .send()
            .await?;
        let run: RunObject = check_status(response).await?.json().await?;
        trace!(run_id, status = %run.status, "Retrieved run");
        Ok(run.into())
    }

    async fn list_messages(&self, thread_id: &str) -> anyhow::Result<Vec<ThreadMessage>> {
        let response = self
            .beta(Method::GET, &format!("/threads/{thread_id}/messages"))
            .query(&[("order", "asc")])
            .send()
            .await?;
        let list: MessageList = check_status(response).await?.json().await?;
        Ok(list.data.into_iter().map(ThreadMessage::from).collect())
    }

    async fn retrieve_file(&self, file_id: &str) -> anyhow::Result<FileInfo> {
        let response = self.request(Method::GET, &format!("/files/{file_id}")).send().await?;
        let file: FileObject = check_status(response).await?.json().await?;
        Ok(FileInfo {
            id: file.id,
            filename: file.filename,
        })
    }
}
