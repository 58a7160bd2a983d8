//! Error taxonomy shared by every LinkPost crate.

use std::fmt;

/// Stage of a generate-and-publish cycle, recorded on `LinkPostError::Cycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    LoadConfig,
    SelectTopic,
    Generate,
    Publish,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleStage::LoadConfig => "load-config",
            CycleStage::SelectTopic => "select-topic",
            CycleStage::Generate => "generate",
            CycleStage::Publish => "publish",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LinkPostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("API key missing for provider: {0}")]
    ApiKeyMissing(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Cycle failed at {stage}{}: {source}", topic_suffix(.topic))]
    Cycle {
        stage: CycleStage,
        topic: Option<String>,
        #[source]
        source: Box<LinkPostError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn topic_suffix(topic: &Option<String>) -> String {
    topic
        .as_ref()
        .map(|t| format!(" (topic: {t})"))
        .unwrap_or_default()
}

impl LinkPostError {
    /// Wrap an error raised while running a cycle.
    pub fn cycle(stage: CycleStage, topic: Option<&str>, source: LinkPostError) -> Self {
        Self::Cycle {
            stage,
            topic: topic.map(String::from),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through any `Cycle` wrappers.
    pub fn root_cause(&self) -> &LinkPostError {
        match self {
            Self::Cycle { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the root cause is a configuration problem.
    pub fn is_config(&self) -> bool {
        matches!(self.root_cause(), Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, LinkPostError>;
