//! Interactive chat shell: password gate, user setup, and the question loop.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dialoguer::{Input, Password, Select};
use tracing::{debug, info};

use rag_tutor_agent::Tutor;
use rag_tutor_agent::speech::{ASK_FIRST_MESSAGE, ListenOutcome};
use rag_tutor_core::config::Config;
use rag_tutor_core::session::SessionState;
use rag_tutor_core::types::ExperienceLevel;

use crate::render::{self, ShellInput};

/// Prompt until the entered password matches. Mismatches are not errors.
pub fn password_gate(config: &Config) -> anyhow::Result<()> {
    let Some(expected) = config.password() else {
        anyhow::bail!("No access password configured (set access.password or access.password_env)");
    };

    loop {
        let entered = Password::new().with_prompt("Password").interact()?;
        if render::password_matches(&entered, &expected) {
            debug!("Password accepted");
            return Ok(());
        }
        println!("Password incorrect.");
        println!("{}", config.contact_message());
    }
}

fn prompt_user() -> anyhow::Result<SessionState> {
    let name: String = Input::new().with_prompt("What is your name?").interact_text()?;

    let labels = render::level_labels();
    let idx = Select::new()
        .with_prompt(render::LEVEL_PROMPT)
        .items(&labels)
        .default(0)
        .interact()?;
    let level = ExperienceLevel::ALL[idx];

    Ok(SessionState::new(name.trim(), level))
}

/// Write the latest answer's audio to `path`.
pub async fn save_audio(tutor: &Tutor, state: &SessionState, path: &Path) -> anyhow::Result<Option<PathBuf>> {
    match tutor.listen(state).await? {
        ListenOutcome::Audio(audio) => {
            std::fs::write(path, &audio)
                .with_context(|| format!("Failed to write audio to {}", path.display()))?;
            info!(path = %path.display(), bytes = audio.len(), "Saved audio");
            Ok(Some(path.to_path_buf()))
        }
        ListenOutcome::AskFirst => Ok(None),
    }
}

pub async fn run_chat(config: &Config, tutor: &Tutor) -> anyhow::Result<()> {
    println!("{}", render::banner());

    password_gate(config)?;

    let mut state = prompt_user()?;
    info!(session = %state.short_id(), level = %state.level, "Session started");
    println!("{}", render::HELP);

    loop {
        let line: String = Input::new()
            .with_prompt("Ask a question")
            .default(render::DEFAULT_QUESTION.to_string())
            .interact_text()?;

        match render::parse_input(&line) {
            ShellInput::Ask("") => continue,
            ShellInput::Ask(question) => {
                println!("Waiting for the assistant to respond...");
                let outcome = tutor.ask(&mut state, question).await;
                println!("\n{}\n", render::render_outcome(&outcome));
            }
            ShellInput::History => {
                println!("\n{}\n", state.transcript.render_markdown());
            }
            ShellInput::Save(dir) => {
                let dir = PathBuf::from(dir.unwrap_or("."));
                match state.transcript.export_to_dir(&dir) {
                    Ok(path) => println!("Saved conversation to {}", path.display()),
                    Err(e) => println!("An error occurred: {e}"),
                }
            }
            ShellInput::Listen => {
                println!("Generating audio...");
                match save_audio(tutor, &state, &config.tts_output_path()).await {
                    Ok(Some(path)) => println!("Saved audio to {}", path.display()),
                    Ok(None) => println!("{ASK_FIRST_MESSAGE}"),
                    Err(e) => println!("An error occurred: {e:#}"),
                }
            }
            ShellInput::Reset => {
                state.reset();
                println!("Conversation cleared.");
            }
            ShellInput::Help => println!("{}", render::HELP),
            ShellInput::Quit => break,
            ShellInput::Unknown(name) => {
                println!("Unknown command /{name}. {}", render::HELP);
            }
        }
    }

    info!(session = %state.short_id(), turns = state.transcript.len(), "Session ended");
    Ok(())
}
