//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use super::file::AppConfig;
use crate::utils::stack::DEDUP_WINDOW;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Project configuration
    pub project: ProjectConfig,
    /// Error reporting configuration
    pub reporting: ReportingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Project configuration
///
/// Missing values disable the subsystems that need them instead of failing at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project identifier scoping all reports and AI usage
    pub project_id: Option<String>,
    /// API base URL
    pub api_url: Option<String>,
    /// Application version sent with error reports
    pub app_version: String,
}

/// Error reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Whether error reporting is enabled
    pub enabled: bool,
    /// Dedup window in milliseconds
    pub dedup_window_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dedup_window_ms: DEDUP_WINDOW.as_millis() as u64,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            project: ProjectConfig {
                project_id: get_env_optional("APP_PROJECT_ID"),
                api_url: get_env_optional("APP_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string()),
                app_version: get_env_or_default("APP_VERSION", env!("CARGO_PKG_VERSION")),
            },
            reporting: ReportingConfig {
                enabled: get_env_or_default("ERROR_REPORTING_ENABLED", "true")
                    .parse()
                    .context("Invalid error reporting enabled flag")?,
                dedup_window_ms: get_env_or_default(
                    "ERROR_DEDUP_WINDOW_MS",
                    &DEDUP_WINDOW.as_millis().to_string(),
                )
                    .parse()
                    .context("Invalid dedup window")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Settings for an explicit project, everything else defaulted
    pub fn for_project(project_id: impl Into<String>, api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            project: ProjectConfig {
                project_id: Some(project_id.into()),
                api_url: Some(api_url.trim_end_matches('/').to_string()),
                app_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            reporting: ReportingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Settings with nothing configured
    pub fn unconfigured() -> Self {
        Self {
            project: ProjectConfig {
                app_version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            reporting: ReportingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Overlay values from a host configuration file
    ///
    /// File values win over environment values.
    pub fn with_app_config(mut self, app_config: &AppConfig) -> Result<Self> {
        if let Some(project_id) = &app_config.project_id {
            self.project.project_id = Some(project_id.clone());
        }
        if let Some(api_url) = &app_config.api_url {
            self.project.api_url = Some(api_url.trim_end_matches('/').to_string());
        }
        if let Some(app_version) = &app_config.app_version {
            self.project.app_version = app_version.clone();
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        // Empty strings count as missing, but a present URL must look like one
        if let Some(api_url) = self.api_url() {
            if !api_url.starts_with("http") {
                anyhow::bail!("Invalid API URL format, should start with 'http'");
            }
        }

        if self.reporting.dedup_window_ms == 0 {
            anyhow::bail!("Dedup window cannot be 0");
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        // Validate log format
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Configured project identifier, if any
    pub fn project_id(&self) -> Option<&str> {
        self.project.project_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Configured API base URL, if any
    pub fn api_url(&self) -> Option<&str> {
        self.project.api_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Both the project identifier and the API URL are present
    pub fn is_configured(&self) -> bool {
        self.project_id().is_some() && self.api_url().is_some()
    }

    /// Dedup window as a duration
    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.reporting.dedup_window_ms)
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable, treating empty values as unset
fn get_env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
