//! Data models module
//!
//! Defines error report records and AI API request and response structures

use serde::{Deserialize, Serialize};

pub mod ai;
pub mod report;

/// Response envelope shared by all AI endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the server accepted the request
    #[serde(default)]
    pub success: bool,
    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Server-supplied error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, or the server's error message (falling back to `default_error`)
    pub fn into_data(self, default_error: &str) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.unwrap_or_else(|| default_error.to_string())),
        }
    }
}
