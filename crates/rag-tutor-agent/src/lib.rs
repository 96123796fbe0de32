//! Tutor runtime: drives one question through the hosted assistant.
//!
//! A request appends the user turn, condenses the transcript when it grows
//! past the token budget, runs a [`session::ConversationSession`] against the
//! assistant backend, and resolves annotations into citation footnotes. The
//! [`tutor::Tutor`] ties these together with the memoized speech client.

use serde::{Deserialize, Serialize};

use rag_tutor_core::types::Citation;

pub mod citations;
pub mod compaction;
pub mod prompt;
pub mod session;
pub mod speech;
pub mod summarizer;
pub mod tutor;

pub use tutor::Tutor;

/// Message shown when a run never completes within the poll budget.
pub const TIMED_OUT_MESSAGE: &str = "Run timed out";

/// One assistant message from a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Text as returned by the backend. This is what the transcript stores.
    pub text: String,
    /// Text with annotation spans replaced by `[i]` markers.
    pub display_text: String,
    pub citations: Vec<Citation>,
}

/// Terminal result of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestOutcome {
    Success { answers: Vec<Answer> },
    TimedOut,
    BackendError { message: String },
}

impl RequestOutcome {
    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::BackendError {
            message: message.into(),
        }
    }

    /// Citations across all answers, in answer order.
    pub fn citations(&self) -> Vec<&Citation> {
        match self {
            Self::Success { answers } => answers.iter().flat_map(|a| a.citations.iter()).collect(),
            Self::TimedOut | Self::BackendError { .. } => Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
