//! Per-user session state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transcript::Transcript;
use crate::types::ExperienceLevel;

/// State scoped to one interactive user. Never shared between users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub user_name: String,
    pub level: ExperienceLevel,
    pub transcript: Transcript,
    /// Raw text of the most recent assistant answer; empty until one arrives.
    pub current_response: String,
}

impl SessionState {
    pub fn new(user_name: impl Into<String>, level: ExperienceLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_name: user_name.into(),
            level,
            transcript: Transcript::new(),
            current_response: String::new(),
        }
    }

    /// Discard the conversation and start over with the same user settings.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.transcript = Transcript::new();
        self.current_response.clear();
    }

    /// Short id for log fields.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}
