//! Error types for standin

use thiserror::Error;

/// Result type alias for standin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in standin
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Intent classification error
    #[error("NLU error: {0}")]
    Nlu(String),

    /// Response library error
    #[error("responses error: {0}")]
    Responses(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
