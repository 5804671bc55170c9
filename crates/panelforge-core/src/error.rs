//! Error types for Panelforge

use panelforge_session::StorageError;
use thiserror::Error;

/// Result type alias for Panelforge operations
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Main error type for Panelforge
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Story drafting errors
    #[error("Story error: {0}")]
    Story(String),

    /// Image generation errors
    #[error("Generation error: {0}")]
    Generation(String),

    /// Session storage errors
    #[error("Session error: {0}")]
    Session(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ForgeError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new story error
    pub fn story(message: impl Into<String>) -> Self {
        Self::Story(message.into())
    }

    /// Create a new generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
