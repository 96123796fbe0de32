use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use rag_tutor_agent::Tutor;
use rag_tutor_core::config::{Config, LoggingConfig};
use rag_tutor_core::session::SessionState;
use rag_tutor_core::types::ExperienceLevel;
use rag_tutor_providers::Credentials;
use rag_tutor_providers::openai::OpenAiClient;

mod render;
mod shell;

#[derive(Parser)]
#[command(
    name = "rag-tutor",
    about = "Retrieval-augmented tutoring assistant for ML, AI, and statistics topics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive tutoring session (default)
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// Question to send
        #[arg(short, long)]
        message: String,

        /// Your name, used in the instructions and transcript
        #[arg(short, long, default_value = "Student")]
        name: String,

        /// Experience level: basics or advanced
        #[arg(short, long, default_value = "basics")]
        level: ExperienceLevel,

        /// Also save an audio version of the answer
        #[arg(long)]
        listen: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Check the configuration for problems
    Validate,
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        logging.level.clone().unwrap_or_else(|| "info".to_string())
    };
    let directives = std::iter::once(level)
        .chain(logging.filters.iter().cloned())
        .collect::<Vec<_>>()
        .join(",");

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match (logging.format.as_str(), logging.output.as_str()) {
        ("json", "stdout") => builder.json().with_writer(std::io::stdout).init(),
        ("json", _) => builder.json().with_writer(std::io::stderr).init(),
        (_, "stdout") => builder.with_writer(std::io::stdout).init(),
        _ => builder.with_writer(std::io::stderr).init(),
    }
}

fn build_tutor(config: &Config) -> anyhow::Result<Tutor> {
    let Some(api_key) = config.openai_api_key() else {
        anyhow::bail!("No OpenAI API key configured (set openai.api_key or OPENAI_API_KEY)");
    };
    if config.assistant_id().is_none() {
        anyhow::bail!("No assistant id configured (set assistant.assistant_id)");
    }

    let client = OpenAiClient::new(
        config.openai_base_url().as_deref(),
        Credentials::ApiKey { api_key },
    )
    .with_retrieval_tool(config.retrieval_tool());

    Ok(Tutor::from_config(config, Arc::new(client)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_path);

    let config = Config::load(&config_path)?;
    init_logging(&config.logging.clone().unwrap_or_default(), cli.verbose);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let tutor = build_tutor(&config)?;
            shell::run_chat(&config, &tutor).await?;
        }
        Commands::Ask {
            message,
            name,
            level,
            listen,
        } => {
            let tutor = build_tutor(&config)?;
            let mut state = SessionState::new(name, level);
            let outcome = tutor.ask(&mut state, &message).await;
            println!("{}", render::render_outcome(&outcome));

            if listen && outcome.is_success() {
                match shell::save_audio(&tutor, &state, &config.tts_output_path()).await? {
                    Some(path) => println!("Saved audio to {}", path.display()),
                    None => println!("{}", rag_tutor_agent::speech::ASK_FIRST_MESSAGE),
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Validate => {
                let (warnings, errors) = config.validate();
                println!("Config: {}", config_path.display());
                for warning in &warnings {
                    println!("warning: {warning}");
                }
                for error in &errors {
                    println!("error: {error}");
                }
                if !errors.is_empty() {
                    anyhow::bail!("Config has {} error(s)", errors.len());
                }
                if warnings.is_empty() {
                    println!("Config OK");
                }
            }
        },
    }

    Ok(())
}
