//! Conversation session: one request's trip through the assistant backend.
//!
//! Each request walks `Created → Submitted → Running` and ends in exactly one
//! of `Completed`, `TimedOut` or `Failed`. A fresh backend thread is created
//! per request; nothing is reused between requests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};

use rag_tutor_core::config::Config;
use rag_tutor_core::types::{ExperienceLevel, RunHandle, RunStatus};
use rag_tutor_providers::{AssistantBackend, MessageRole, RunRequest};

use crate::citations::resolve_answer;
use crate::prompt::build_instructions;
use crate::RequestOutcome;

/// Request lifecycle phase, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Submitted,
    Running,
    Completed,
    TimedOut,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub assistant_id: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            assistant_id: config.assistant_id().unwrap_or_default(),
            poll_interval: config.poll_interval(),
            max_poll_attempts: config.max_poll_attempts(),
        }
    }
}

/// Why polling stopped.
enum PollEnd {
    Completed,
    TimedOut,
    Failed(String),
}

pub struct ConversationSession {
    backend: Arc<dyn AssistantBackend>,
    settings: SessionSettings,
}

impl ConversationSession {
    pub fn new(backend: Arc<dyn AssistantBackend>, settings: SessionSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Run one request to a terminal outcome. Never returns an error: any
    /// backend failure becomes [`RequestOutcome::BackendError`].
    pub async fn run(&self, user_name: &str, level: ExperienceLevel, user_text: &str) -> RequestOutcome {
        match self.try_run(user_name, level, user_text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Request failed");
                log_phase(Phase::Failed, None);
                RequestOutcome::backend_error(format!("{e:#}"))
            }
        }
    }

    async fn try_run(&self, user_name: &str, level: ExperienceLevel, user_text: &str) -> anyhow::Result<RequestOutcome> {
        let thread_id = self
            .backend
            .create_thread()
            .await
            .context("Failed to create thread")?;
        log_phase(Phase::Created, Some(&thread_id));

        self.backend
            .add_user_message(&thread_id, user_text)
            .await
            .context("Failed to submit message")?;
        log_phase(Phase::Submitted, Some(&thread_id));

        let request = RunRequest {
            assistant_id: self.settings.assistant_id.clone(),
            instructions: build_instructions(user_name, level),
            retrieval: true,
        };
        let run = self
            .backend
            .create_run(&thread_id, &request)
            .await
            .context("Failed to start run")?;
        log_phase(Phase::Running, Some(&thread_id));

        let mut handle = RunHandle {
            session_id: thread_id,
            run_id: run.id,
            status: run.status,
            attempts: 0,
        };
        let mut last_error = run.last_error;

        match self.poll(&mut handle, &mut last_error).await? {
            PollEnd::Completed => {}
            PollEnd::TimedOut => {
                info!(run_id = %handle.run_id, attempts = handle.attempts, "Run timed out");
                log_phase(Phase::TimedOut, Some(&handle.session_id));
                return Ok(RequestOutcome::TimedOut);
            }
            PollEnd::Failed(reason) => {
                anyhow::bail!("Run failed: {reason}");
            }
        }
        log_phase(Phase::Completed, Some(&handle.session_id));

        let messages = self
            .backend
            .list_messages(&handle.session_id)
            .await
            .context("Failed to list messages")?;

        let mut answers = Vec::new();
        for message in messages.iter().filter(|m| m.role == MessageRole::Assistant) {
            let Some(text) = message.first_text().filter(|t| !t.value.is_empty()) else {
                continue;
            };
            answers.push(resolve_answer(self.backend.as_ref(), text).await?);
        }

        info!(
            run_id = %handle.run_id,
            attempts = handle.attempts,
            answers = answers.len(),
            "Run completed"
        );
        Ok(RequestOutcome::Success { answers })
    }

    /// Poll until the run completes, fails, or the attempt budget is spent.
    ///
    /// The status reported at creation counts as free; every fetch after that
    /// increments `handle.attempts`, which never exceeds the configured maximum.
    async fn poll(&self, handle: &mut RunHandle, last_error: &mut Option<String>) -> anyhow::Result<PollEnd> {
        loop {
            match handle.status {
                RunStatus::Completed => return Ok(PollEnd::Completed),
                RunStatus::Failed => {
                    return Ok(PollEnd::Failed(
                        last_error.take().unwrap_or_else(|| "no details provided".to_string()),
                    ));
                }
                RunStatus::Queued | RunStatus::InProgress | RunStatus::TimedOut => {}
            }

            if handle.attempts >= self.settings.max_poll_attempts {
                handle.status = RunStatus::TimedOut;
                return Ok(PollEnd::TimedOut);
            }

            tokio::time::sleep(self.settings.poll_interval).await;

            let run = self
                .backend
                .retrieve_run(&handle.session_id, &handle.run_id)
                .await
                .context("Failed to check run status")?;
            handle.attempts += 1;
            handle.status = run.status;
            *last_error = run.last_error;
            debug!(
                run_id = %handle.run_id,
                attempt = handle.attempts,
                status = ?handle.status,
                "Polled run"
            );
        }
    }
}

fn log_phase(phase: Phase, thread_id: Option<&str>) {
    debug!(?phase, thread_id = thread_id.unwrap_or("-"), "Session transition");
}
