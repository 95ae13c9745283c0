use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GleanFidesError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Snapshot error ({path}): {message}")]
    Persistence { path: PathBuf, message: String },

    #[error("Text generation failed: {message}")]
    Generation { message: String },

    #[error("Malformed record '{record}': missing field '{field}'")]
    MalformedRecord { record: String, field: String },

    #[error("Model answered with an unknown category: '{response}'")]
    InvalidResponse { response: String },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: {message}")]
    ConfigValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Home directory not found")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, GleanFidesError>;

impl GleanFidesError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => 2,
            Self::Transport { .. } => 3,
            Self::Persistence { .. } => 4,
            Self::Generation { .. } => 5,
            Self::MalformedRecord { .. } => 6,
            Self::InvalidResponse { .. } => 7,
            _ => 1,
        }
    }

    pub(crate) fn transport(url: &str, message: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}
