//! Top-level orchestrator used by the shell.

use std::sync::Arc;

use tracing::{info, warn};

use rag_tutor_core::config::Config;
use rag_tutor_core::session::SessionState;
use rag_tutor_providers::openai::OpenAiClient;

use crate::compaction::{TruncationOutcome, truncate_if_over_budget};
use crate::session::{ConversationSession, SessionSettings};
use crate::speech::{ListenOutcome, SpeechSynthesizer};
use crate::summarizer::Summarizer;
use crate::RequestOutcome;

pub struct Tutor {
    session: ConversationSession,
    summarizer: Summarizer,
    speech: SpeechSynthesizer,
    max_context_tokens: usize,
}

impl Tutor {
    pub fn new(
        session: ConversationSession,
        summarizer: Summarizer,
        speech: SpeechSynthesizer,
        max_context_tokens: usize,
    ) -> Self {
        Self {
            session,
            summarizer,
            speech,
            max_context_tokens,
        }
    }

    /// Wire every collaborator to one OpenAI client.
    pub fn from_config(config: &Config, client: Arc<OpenAiClient>) -> Self {
        Self::new(
            ConversationSession::new(client.clone(), SessionSettings::from_config(config)),
            Summarizer::from_config(client.clone(), config),
            SpeechSynthesizer::from_config(client, config),
            config.max_context_tokens(),
        )
    }

    pub fn speech(&self) -> &SpeechSynthesizer {
        &self.speech
    }

    /// Ask one question on behalf of the session's user.
    ///
    /// The user turn is appended before anything can fail and is kept even
    /// when the request does not succeed.
    pub async fn ask(&self, state: &mut SessionState, question: &str) -> RequestOutcome {
        state.transcript.append_user(&state.user_name, question);

        match truncate_if_over_budget(&mut state.transcript, self.max_context_tokens, &self.summarizer).await {
            Ok(TruncationOutcome::Summarized { replaced }) => {
                info!(session = %state.short_id(), replaced, "Transcript summarized");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(session = %state.short_id(), error = %format!("{e:#}"), "Truncation failed");
                return RequestOutcome::backend_error(format!("{e:#}"));
            }
        }

        let outcome = self.session.run(&state.user_name, state.level, question).await;

        if let RequestOutcome::Success { answers } = &outcome {
            for answer in answers {
                state.transcript.append_assistant(answer.text.clone());
            }
            if let Some(last) = answers.last() {
                state.current_response = last.text.clone();
            }
        }

        outcome
    }

    /// Read the most recent answer aloud, or ask the user to ask first.
    pub async fn listen(&self, state: &SessionState) -> anyhow::Result<ListenOutcome> {
        self.speech.listen(&state.current_response).await
    }
}
