//! HTTP-level tests for the OpenAI client against a local mock server.

use rag_tutor_core::types::RunStatus;
use rag_tutor_providers::openai::OpenAiClient;
use rag_tutor_providers::{
    Annotation, AssistantBackend, CompletionBackend, Credentials, MessageRole, RunRequest,
    SpeechBackend,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(
        Some(&server.uri()),
        Credentials::ApiKey {
            api_key: "sk-test".into(),
        },
    )
}

#[tokio::test]
async fn test_chat_completion_sends_system_and_user_prompts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "Summarize this."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "A summary."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server)
        .complete("gpt-3.5-turbo", "You are a helpful assistant.", "Summarize this.")
        .await
        .unwrap();
    assert_eq!(text, "A summary.");
}

#[tokio::test]
async fn test_error_status_includes_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete("gpt-3.5-turbo", "sys", "user")
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("401"), "got: {message}");
    assert!(message.contains("invalid api key"), "got: {message}");
}

#[tokio::test]
async fn test_speech_returns_audio_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(body_partial_json(json!({"model": "tts-1", "voice": "alloy", "input": "Hello there"})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]))
        .expect(1)
        .mount(&server)
        .await;

    let audio = client(&server)
        .synthesize("tts-1", "alloy", "Hello there")
        .await
        .unwrap();
    assert_eq!(&audio[..], &[0xFF, 0xFB, 0x90, 0x00]);
}

#[tokio::test]
async fn test_assistant_thread_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/threads"))
        .and(header("OpenAI-Beta", "assistants=v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_1", "object": "thread"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/threads/thread_1/messages"))
        .and(body_partial_json(json!({"role": "user", "content": "What is RAG?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "msg_u", "role": "user"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/threads/thread_1/runs"))
        .and(body_partial_json(json!({
            "assistant_id": "asst_1",
            "tools": [{"type": "file_search"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "run_1", "status": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "run_1", "status": "completed"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/threads/thread_1/messages"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "msg_u", "role": "user", "content": [
                    {"type": "text", "text": {"value": "What is RAG?", "annotations": []}}
                ]},
                {"id": "msg_a", "role": "assistant", "content": [
                    {"type": "text", "text": {
                        "value": "Retrieval first【1†source】.",
                        "annotations": [{
                            "type": "file_citation",
                            "text": "【1†source】",
                            "file_citation": {"file_id": "file-1", "quote": "retrieve then generate"}
                        }]
                    }}
                ]}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/files/file-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "file-1", "filename": "rag_notes.pdf"})))
        .mount(&server)
        .await;

    let client = client(&server);
    let thread_id = client.create_thread().await.unwrap();
    assert_eq!(thread_id, "thread_1");

    client.add_user_message(&thread_id, "What is RAG?").await.unwrap();

    let run = client
        .create_run(
            &thread_id,
            &RunRequest {
                assistant_id: "asst_1".into(),
                instructions: "Be helpful.".into(),
                retrieval: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(run.status, RunStatus::Queued);

    let run = client.retrieve_run(&thread_id, &run.id).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);

    let messages = client.list_messages(&thread_id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].role, MessageRole::Assistant);

    let text = messages[1].first_text().unwrap();
    match &text.annotations[0] {
        Annotation::FileCitation { file_id, quote, .. } => {
            assert_eq!(file_id, "file-1");
            assert_eq!(quote, "retrieve then generate");
        }
        other => panic!("expected file citation, got {other:?}"),
    }

    let file = client.retrieve_file("file-1").await.unwrap();
    assert_eq!(file.filename, "rag_notes.pdf");
}

#[tokio::test]
async fn test_failed_run_reports_last_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "run_1",
            "status": "failed",
            "last_error": {"code": "server_error", "message": "Something broke"}
        })))
        .mount(&server)
        .await;

    let run = client(&server).retrieve_run("thread_1", "run_1").await.unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.last_error.as_deref(), Some("server_error: Something broke"));
}
