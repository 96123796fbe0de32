//! Transcript store: the ordered, append-only log of conversation turns.
//!
//! The only non-append mutation is [`Transcript::replace_middle`], which swaps
//! the turns between the first and last [`KEEP_EDGE`] turns for one summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Speaker;

/// Turns preserved verbatim at each end of the transcript during truncation.
pub const KEEP_EDGE: usize = 2;

/// File name offered for the exported transcript.
pub const EXPORT_FILE_NAME: &str = "conversation.txt";

/// MIME type of the exported transcript.
pub const EXPORT_MIME_TYPE: &str = "text/plain";

/// Display label used for assistant turns.
pub const ASSISTANT_AUTHOR: &str = "AI";

/// A single message unit in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    /// Display label captured when the turn was appended.
    pub author: String,
    pub text: String,
    pub ordinal: u64,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Whitespace-delimited word count, used as a token estimate.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Markdown rendering used for display and export.
    pub fn render(&self) -> String {
        match self.speaker {
            Speaker::Summary => self.text.clone(),
            Speaker::User | Speaker::Assistant => format!("**{}:** {}", self.author, self.text),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
    next_ordinal: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end. Content is not validated.
    pub fn append(&mut self, speaker: Speaker, author: impl Into<String>, text: impl Into<String>) -> &Turn {
        let turn = Turn {
            speaker,
            author: author.into(),
            text: text.into(),
            ordinal: self.next_ordinal,
            created_at: Utc::now(),
        };
        self.next_ordinal += 1;
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    pub fn append_user(&mut self, name: &str, text: impl Into<String>) -> &Turn {
        self.append(Speaker::User, name, text)
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) -> &Turn {
        self.append(Speaker::Assistant, ASSISTANT_AUTHOR, text)
    }

    /// Sum of word counts across all turns. An approximation, not a tokenizer.
    pub fn estimate_size(&self) -> usize {
        self.turns.iter().map(Turn::word_count).sum()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Most recent user turn, if any.
    pub fn last_user_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.speaker == Speaker::User)
    }

    /// Turns strictly between the first and last [`KEEP_EDGE`] turns.
    ///
    /// Empty when the transcript has fewer than `2 * KEEP_EDGE + 1` turns.
    pub fn middle_span(&self) -> &[Turn] {
        if self.turns.len() <= KEEP_EDGE * 2 {
            return &[];
        }
        &self.turns[KEEP_EDGE..self.turns.len() - KEEP_EDGE]
    }

    /// Space-joined text of the middle span, as fed to the summarizer.
    pub fn middle_text(&self) -> String {
        self.middle_span()
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replace the middle span with a single summary turn.
    ///
    /// Returns the number of turns replaced; 0 (and no change) when the
    /// middle span is empty.
    pub fn replace_middle(&mut self, summary: impl Into<String>) -> usize {
        let replaced = self.middle_span().len();
        if replaced == 0 {
            return 0;
        }

        let summary_turn = Turn {
            speaker: Speaker::Summary,
            author: String::new(),
            text: summary.into(),
            ordinal: self.next_ordinal,
            created_at: Utc::now(),
        };
        self.next_ordinal += 1;

        let end = self.turns.len() - KEEP_EDGE;
        self.turns.splice(KEEP_EDGE..end, std::iter::once(summary_turn));
        replaced
    }

    /// Full transcript as Markdown-flavored text, turns separated by a blank line.
    pub fn render_markdown(&self) -> String {
        self.turns
            .iter()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Write the rendered transcript into `dir` as [`EXPORT_FILE_NAME`].
    pub fn export_to_dir(&self, dir: &std::path::Path) -> crate::error::Result<std::path::PathBuf> {
        let path = dir.join(EXPORT_FILE_NAME);
        std::fs::write(&path, self.render_markdown())?;
        tracing::debug!(path = %path.display(), turns = self.turns.len(), "Exported transcript");
        Ok(path)
    }
}
