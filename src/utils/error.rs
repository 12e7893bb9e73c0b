//! Error types for the gateway
//!
//! `OrchestratorError` covers configuration, startup and server faults.
//! Upstream provider failures use `core::providers::ProviderError` and are
//! classified separately before any retry or failover decision.

use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Main error type for gateway setup and serving
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Server errors
    #[error("Server error: {0}")]
    Server(String),
}

impl OrchestratorError {
    /// Shorthand for a configuration error with a formatted message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
