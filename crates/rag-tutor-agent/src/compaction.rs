//! Transcript truncation: summarize the middle once the word budget is exceeded.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use rag_tutor_core::transcript::Transcript;

use crate::summarizer::Summarizer;

/// What [`truncate_if_over_budget`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TruncationOutcome {
    /// Size estimate is at or under the budget.
    WithinBudget,
    /// Over budget, but there is no middle span to condense.
    TooShort,
    /// `replaced` turns were swapped for one summary turn.
    Summarized { replaced: usize },
    /// The summarizer returned nothing; transcript kept as-is.
    EmptySummary,
}

/// Condense the transcript if its size estimate exceeds `budget`.
///
/// The first and last two turns are always kept verbatim. Summarizer errors
/// propagate and leave the transcript unchanged.
pub async fn truncate_if_over_budget(
    transcript: &mut Transcript,
    budget: usize,
    summarizer: &Summarizer,
) -> anyhow::Result<TruncationOutcome> {
    let current = transcript.estimate_size();
    debug!(current, budget, "Checking if truncation needed");

    if current <= budget {
        return Ok(TruncationOutcome::WithinBudget);
    }

    if transcript.middle_span().is_empty() {
        debug!(turns = transcript.len(), "Over budget but too few turns to summarize");
        return Ok(TruncationOutcome::TooShort);
    }

    info!(current, budget, "Transcript exceeds budget, summarizing");

    let summary = summarizer.summarize(&transcript.middle_text()).await?;
    if summary.is_empty() {
        warn!("Summarizer returned empty text, keeping transcript as-is");
        return Ok(TruncationOutcome::EmptySummary);
    }

    let replaced = transcript.replace_middle(summary);
    info!(
        replaced,
        old_size = current,
        new_size = transcript.estimate_size(),
        "Truncation complete"
    );
    Ok(TruncationOutcome::Summarized { replaced })
}
