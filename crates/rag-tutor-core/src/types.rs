use serde::{Deserialize, Serialize};

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
    /// A condensed stand-in for a span of earlier turns.
    Summary,
}

/// How the assistant should pitch its answers. Chosen once per session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Basics,
    Advanced,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 2] = [ExperienceLevel::Basics, ExperienceLevel::Advanced];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Basics => "Basics",
            Self::Advanced => "Advanced",
        }
    }

    /// Mission statement injected into the run instructions.
    pub fn mission(&self) -> &'static str {
        match self {
            Self::Basics => {
                "Your mission is to teach the user through analogies about machine learning, AI, \
                 and statistical analysis topics, emphasizing those covered in the provided context. \
                 Be friendly, fun, and helpful and try Feynman techniques and analogies. This is a \
                 very important mission for this user who is new to the topic. "
            }
            Self::Advanced => {
                "Your mission is to teach this advanced user about machine learning, AI, and \
                 statistical analysis topics, emphasizing those covered in the provided context. \
                 Be focused, brief, to the point. No disclaimers. This is a very important mission \
                 for this user who is trying to be maximally efficient. "
            }
        }
    }
}

impl std::str::FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basics" | "basic" => Ok(Self::Basics),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown experience level '{other}' (expected basics or advanced)")),
        }
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A footnote derived from an assistant message annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Position of the annotation in the message's annotation list.
    pub index: usize,
    /// Quoted excerpt, empty for file-path annotations.
    pub source_quote: String,
    /// Rendered footnote line, e.g. `[0] some quote from notes.pdf`.
    pub source_label: String,
    pub file_name: String,
}

/// Lifecycle status of a backend run as seen by this application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    TimedOut,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }
}

/// One run against one backend session context. Never reused across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHandle {
    pub session_id: String,
    pub run_id: String,
    pub status: RunStatus,
    /// Number of status fetches performed so far.
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_level_parse() {
        assert_eq!("Basics".parse::<ExperienceLevel>(), Ok(ExperienceLevel::Basics));
        assert_eq!(" advanced ".parse::<ExperienceLevel>(), Ok(ExperienceLevel::Advanced));
        assert!("expert".parse::<ExperienceLevel>().is_err());
    }

    #[test]
    fn test_missions_differ() {
        let basics = ExperienceLevel::Basics.mission();
        let advanced = ExperienceLevel::Advanced.mission();
        assert_ne!(basics, advanced);
        assert!(basics.contains("analogies"));
        assert!(advanced.contains("No disclaimers"));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::TimedOut.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
    }
}
