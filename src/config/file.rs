//! File-based configuration loading
//!
//! Loads the host application's project settings from a JSON file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Host application configuration loaded from JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Project identifier
    #[serde(rename = "projectId", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// API base URL
    #[serde(rename = "apiUrl", default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Application version reported with errors
    #[serde(rename = "appVersion", default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

impl AppConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AppConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config JSON")?;

        config.validate()?;

        debug!("Project configured: {}", config.project_id.is_some());
        Ok(config)
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. ~/.config/starterkit/starterkit.json
    /// 2. ./starterkit.json
    ///
    /// Returns `None` when no file exists; the environment alone is then used.
    pub fn load_default() -> Result<Option<Self>> {
        // Try home config directory first
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("starterkit").join("starterkit.json");
            if config_path.exists() {
                return Self::load(&config_path).map(Some);
            }
        }

        // Try current directory
        let local_path = Path::new("starterkit.json");
        if local_path.exists() {
            return Self::load(local_path).map(Some);
        }

        debug!("No configuration file found, using environment only");
        Ok(None)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if let Some(api_url) = &self.api_url {
            if !api_url.starts_with("http") {
                anyhow::bail!("Invalid apiUrl: {}", api_url);
            }
        }

        if let Some(project_id) = &self.project_id {
            if project_id.contains(char::is_whitespace) {
                anyhow::bail!("projectId cannot contain whitespace characters");
            }
        }

        Ok(())
    }
}
