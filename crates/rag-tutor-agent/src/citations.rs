//! Turn message annotations into inline `[i]` markers and footnote labels.

use anyhow::Context;
use tracing::trace;

use rag_tutor_core::types::Citation;
use rag_tutor_providers::{Annotation, AssistantBackend, MessageText};

use crate::Answer;

/// Inline marker for the annotation at `index`.
pub fn marker(index: usize) -> String {
    format!("[{index}]")
}

/// Footnote for a quoted file passage.
pub fn file_citation_label(index: usize, quote: &str, file_name: &str) -> String {
    format!("[{index}] {quote} from {file_name}")
}

/// Footnote for a downloadable file.
pub fn file_path_label(index: usize, file_name: &str) -> String {
    format!("[{index}] Click <here> to download {file_name}")
}

/// Replace each annotation's literal span with its marker, in list order.
pub fn apply_markers(value: &str, annotations: &[Annotation]) -> String {
    let mut display = value.to_string();
    for (index, annotation) in annotations.iter().enumerate() {
        let span = annotation.text();
        // An empty span would match between every character.
        if span.is_empty() {
            continue;
        }
        display = display.replace(span, &marker(index));
    }
    display
}

/// Resolve a message's annotations into an [`Answer`].
///
/// File names are looked up through the backend. Annotation kinds other than
/// file citations and file paths yield no footnote but still consume an index.
pub async fn resolve_answer(backend: &dyn AssistantBackend, text: &MessageText) -> anyhow::Result<Answer> {
    let mut citations = Vec::new();

    for (index, annotation) in text.annotations.iter().enumerate() {
        match annotation {
            Annotation::FileCitation { file_id, quote, .. } => {
                let file = backend
                    .retrieve_file(file_id)
                    .await
                    .with_context(|| format!("Failed to look up cited file {file_id}"))?;
                citations.push(Citation {
                    index,
                    source_quote: quote.clone(),
                    source_label: file_citation_label(index, quote, &file.filename),
                    file_name: file.filename,
                });
            }
            Annotation::FilePath { file_id, .. } => {
                let file = backend
                    .retrieve_file(file_id)
                    .await
                    .with_context(|| format!("Failed to look up file {file_id}"))?;
                citations.push(Citation {
                    index,
                    source_quote: String::new(),
                    source_label: file_path_label(index, &file.filename),
                    file_name: file.filename,
                });
            }
            Annotation::Unknown { text } => {
                trace!(index, span = %text, "Skipping unrecognized annotation");
            }
        }
    }

    Ok(Answer {
        text: text.value.clone(),
        display_text: apply_markers(&text.value, &text.annotations),
        citations,
    })
}
