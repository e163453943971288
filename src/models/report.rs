//! Error report data models
//!
//! Defines the captured fault record and the ingestion payload

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capture source of a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Uncaught fault (panic) on any thread
    JsError,
    /// Fault caught by an error boundary while rendering
    ReactError,
    /// Background task that failed without anyone awaiting it
    UnhandledPromise,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::JsError => "js_error",
            ErrorType::ReactError => "react_error",
            ErrorType::UnhandledPromise => "unhandled_promise",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    pub error_type: ErrorType,
    /// RFC 3339 capture time
    pub timestamp: String,
}

impl RuntimeError {
    /// Create a record stamped with the current time
    pub fn new(message: impl Into<String>, error_type: ErrorType) -> Self {
        Self {
            message: message.into(),
            stack: None,
            component_stack: None,
            filename: None,
            line_number: None,
            column_number: None,
            error_type,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_component_stack(mut self, component_stack: impl Into<String>) -> Self {
        self.component_stack = Some(component_stack.into());
        self
    }

    pub fn with_location(mut self, filename: impl Into<String>, line: u32, column: u32) -> Self {
        self.filename = Some(filename.into());
        self.line_number = Some(line);
        self.column_number = Some(column);
        self
    }
}

/// Device metadata attached to every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub platform: String,
    pub version: String,
}

impl DeviceInfo {
    /// Host OS name plus the given application version
    pub fn current(app_version: impl Into<String>) -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
            version: app_version.into(),
        }
    }
}

/// Body of `POST /api/errors/report`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReportPayload {
    pub project_id: String,
    pub error: RuntimeError,
    pub device_info: DeviceInfo,
}
