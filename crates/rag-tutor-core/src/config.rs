//! Configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level RAG Tutor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant: Option<AssistantConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAiConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarizer: Option<SummarizerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts: Option<TtsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Shared-password gate for the interactive shell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Shown below the password prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_message: Option<String>,
}

impl AccessConfig {
    pub fn resolve_password(&self) -> Option<String> {
        resolve_secret_field(&self.password, &self.password_env)
    }
}

/// Hosted assistant identity and retrieval tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id_env: Option<String>,

    /// Tool type sent with each run (default: "file_search").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_tool: Option<String>,
}

impl AssistantConfig {
    pub fn resolve_assistant_id(&self) -> Option<String> {
        resolve_secret_field(&self.assistant_id, &self.assistant_id_env)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Word budget before the transcript middle is summarized (default: 4000).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_context_tokens: Option<usize>,

    /// Seconds between run status checks (default: 5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// Status checks before a run is reported as timed out (default: 10).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Text-to-speech (TTS) configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    /// Answers this short or shorter are not synthesized (default: 5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_chars: Option<usize>,

    /// Where the CLI writes the latest audio (default: "current_response.mp3").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "rag_tutor_agent=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
const DEFAULT_CONTACT_MESSAGE: &str =
    "Please contact the administrator if you need an updated password for access.";

/// Resolve a secret: check the direct value first, then the env-var reference.
pub fn resolve_secret_field(direct: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(val) = direct {
        if !val.is_empty() {
            return Some(val.clone());
        }
    }
    if let Some(env) = env_var {
        if let Ok(val) = std::env::var(env) {
            if !val.is_empty() {
                return Some(val);
            }
        }
    }
    None
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    ///
    /// A missing file yields the default config.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::TutorError::Io)?;
        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::TutorError::Config(e.to_string()))?;

        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Default config file path.
    pub fn config_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// Shared password, if one is configured.
    pub fn password(&self) -> Option<String> {
        self.access.as_ref().and_then(|a| a.resolve_password())
    }

    pub fn contact_message(&self) -> String {
        self.access
            .as_ref()
            .and_then(|a| a.contact_message.clone())
            .unwrap_or_else(|| DEFAULT_CONTACT_MESSAGE.to_string())
    }

    pub fn assistant_id(&self) -> Option<String> {
        self.assistant.as_ref().and_then(|a| a.resolve_assistant_id())
    }

    pub fn retrieval_tool(&self) -> String {
        self.assistant
            .as_ref()
            .and_then(|a| a.retrieval_tool.clone())
            .unwrap_or_else(|| "file_search".to_string())
    }

    /// OpenAI API key: configured value, configured env var, then `OPENAI_API_KEY`.
    pub fn openai_api_key(&self) -> Option<String> {
        self.openai
            .as_ref()
            .and_then(|o| o.resolve_api_key())
            .or_else(|| {
                resolve_secret_field(&None, &Some(DEFAULT_OPENAI_KEY_ENV.to_string()))
            })
    }

    pub fn openai_base_url(&self) -> Option<String> {
        self.openai.as_ref().and_then(|o| o.base_url.clone())
    }

    pub fn max_context_tokens(&self) -> usize {
        self.session
            .as_ref()
            .and_then(|s| s.max_context_tokens)
            .unwrap_or(4000)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.session
                .as_ref()
                .and_then(|s| s.poll_interval_secs)
                .unwrap_or(5),
        )
    }

    pub fn max_poll_attempts(&self) -> u32 {
        self.session
            .as_ref()
            .and_then(|s| s.max_poll_attempts)
            .unwrap_or(10)
    }

    pub fn summarizer_model(&self) -> String {
        self.summarizer
            .as_ref()
            .and_then(|s| s.model.clone())
            .unwrap_or_else(|| "gpt-3.5-turbo".to_string())
    }

    pub fn tts_model(&self) -> String {
        self.tts
            .as_ref()
            .and_then(|t| t.model.clone())
            .unwrap_or_else(|| "tts-1".to_string())
    }

    pub fn tts_voice(&self) -> String {
        self.tts
            .as_ref()
            .and_then(|t| t.voice.clone())
            .unwrap_or_else(|| "alloy".to_string())
    }

    pub fn tts_min_chars(&self) -> usize {
        self.tts.as_ref().and_then(|t| t.min_chars).unwrap_or(5)
    }

    pub fn tts_output_path(&self) -> PathBuf {
        self.tts
            .as_ref()
            .and_then(|t| t.output_path.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("current_response.mp3"))
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if self.openai_api_key().is_none() {
            warnings.push(format!(
                "No OpenAI API key configured (set openai.api_key or {DEFAULT_OPENAI_KEY_ENV})"
            ));
        }
        if self.assistant_id().is_none() {
            warnings.push("No assistant id configured (assistant.assistant_id)".to_string());
        }
        if self.password().is_none() {
            warnings.push("No access password configured; the shell cannot be unlocked".to_string());
        }

        if self.max_poll_attempts() == 0 {
            errors.push("session.max_poll_attempts cannot be 0".to_string());
        }
        if self.max_context_tokens() == 0 {
            errors.push("session.max_context_tokens cannot be 0".to_string());
        }

        (warnings, errors)
    }
}

/// Base directory for RAG Tutor data: `~/.rag_tutor/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rag_tutor")
}
