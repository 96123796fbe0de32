//! Plain-text rendering for the terminal shell.

use rag_tutor_agent::{RequestOutcome, TIMED_OUT_MESSAGE};
use rag_tutor_core::types::ExperienceLevel;

pub const TITLE: &str = "Learn about RAG, ML, and AI topics!";

pub const DISCLAIMER: &str = "Disclaimer: This tool provides information about topics covered in \
the provided course materials. By using it you accept the following:
  1. This tool does not generate validated medical content.
  2. This tool is not a real doctor (or statistician).
  3. You will not take any medical action based solely on the output of this tool.";

pub const DEFAULT_QUESTION: &str = "Teach me about RAG.";

pub const LEVEL_PROMPT: &str = "Start with the basics or jump quickly to advanced?";

pub const HELP: &str = "Commands: /history, /save [dir], /listen, /reset, /help, /quit";

pub fn banner() -> String {
    format!(
        "{TITLE}\nRAG Tutor v{}\n\n{DISCLAIMER}\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Plaintext equality against the configured secret.
pub fn password_matches(entered: &str, expected: &str) -> bool {
    entered == expected
}

pub fn level_labels() -> Vec<&'static str> {
    ExperienceLevel::ALL.iter().map(|l| l.label()).collect()
}

/// Answer text with markers, followed by its footnotes.
pub fn render_outcome(outcome: &RequestOutcome) -> String {
    match outcome {
        RequestOutcome::Success { answers } if answers.is_empty() => {
            "The assistant did not return an answer.".to_string()
        }
        RequestOutcome::Success { answers } => {
            let mut blocks = Vec::with_capacity(answers.len());
            for answer in answers {
                let mut block = answer.display_text.clone();
                if !answer.citations.is_empty() {
                    block.push_str("\n\nSources:");
                    for citation in &answer.citations {
                        block.push_str("\n  ");
                        block.push_str(&citation.source_label);
                    }
                }
                blocks.push(block);
            }
            blocks.join("\n\n")
        }
        RequestOutcome::TimedOut => TIMED_OUT_MESSAGE.to_string(),
        RequestOutcome::BackendError { message } => format!("An error occurred: {message}"),
    }
}

/// A parsed line of shell input.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellInput<'a> {
    Ask(&'a str),
    History,
    Save(Option<&'a str>),
    Listen,
    Reset,
    Help,
    Quit,
    Unknown(&'a str),
}

pub fn parse_input(line: &str) -> ShellInput<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ShellInput::Ask(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (command, None),
    };

    match name {
        "history" => ShellInput::History,
        "save" => ShellInput::Save(arg),
        "listen" => ShellInput::Listen,
        "reset" => ShellInput::Reset,
        "help" => ShellInput::Help,
        "quit" | "exit" => ShellInput::Quit,
        _ => ShellInput::Unknown(name),
    }
}
