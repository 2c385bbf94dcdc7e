//! Error types for Tubeblog.

use serde::Serialize;
use thiserror::Error;

/// Library-level error type for Tubeblog operations.
#[derive(Error, Debug)]
pub enum TubeblogError {
    #[error("{0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model API error: {0}")]
    Model(String),

    #[error("Expected output not met: {0}")]
    ContractUnmet(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Content search failed: {0}")]
    Search(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse classification of a failure, reported to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    RateLimit,
    Network,
    ContractUnmet,
    Search,
    Internal,
}

impl TubeblogError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TubeblogError::MissingInput(_) | TubeblogError::InvalidInput(_) => ErrorKind::Validation,
            TubeblogError::Authentication(_) => ErrorKind::Authentication,
            TubeblogError::RateLimited(_) => ErrorKind::RateLimit,
            TubeblogError::Network(_) | TubeblogError::Http(_) => ErrorKind::Network,
            TubeblogError::ContractUnmet(_) => ErrorKind::ContractUnmet,
            TubeblogError::ChannelNotFound(_)
            | TubeblogError::Search(_)
            | TubeblogError::ToolNotFound(_) => ErrorKind::Search,
            TubeblogError::Config(_)
            | TubeblogError::Model(_)
            | TubeblogError::Agent(_)
            | TubeblogError::Io(_)
            | TubeblogError::Json(_)
            | TubeblogError::TomlParse(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for Tubeblog operations.
pub type Result<T> = std::result::Result<T, TubeblogError>;
