use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl PolicyError {
    /// True for errors raised while building settings, before any verdict exists
    pub fn is_configuration(&self) -> bool {
        matches!(self, PolicyError::Config(_) | PolicyError::InvalidSettings(_))
    }
}

pub type Result<T> = std::result::Result<T, PolicyError>;
