//! Error handling module
//!
//! Defines error types surfaced by the AI client and configuration layer

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Subsystem not configured or configuration invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server rejected the request
    #[error("API error: {0}")]
    Api(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::Network(_) => "network_error",
            AppError::Api(_) => "api_error",
            AppError::Serialization(_) => "serialization_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether the error only means the feature is switched off
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create configuration error
    pub fn config_error(message: impl Into<String>) -> AppError {
        AppError::Config(message.into())
    }

    /// Create API error
    pub fn api_error(message: impl Into<String>) -> AppError {
        AppError::Api(message.into())
    }

    /// Create internal error
    pub fn internal_error(message: impl Into<String>) -> AppError {
        AppError::Internal(message.into())
    }
}
