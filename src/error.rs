//! Error types for Reelchat.

use thiserror::Error;

/// Library-level error type for Reelchat operations.
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool round limit ({0}) exceeded")]
    LoopBoundExceeded(usize),

    #[error("Language model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ReelError {
    /// Whether a failed upstream call is worth a second attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ReelError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            _ => false,
        }
    }
}

/// Result type alias for Reelchat operations.
pub type Result<T> = std::result::Result<T, ReelError>;
