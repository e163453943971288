//! Logging utilities
//!
//! Subscriber setup and helpers that keep log lines short

use crate::config::settings::LoggingConfig;
use anyhow::Result;
use tracing::info;

/// Truncate a string with a note about original length
pub fn summarize(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((offset, _)) => format!(
            "{}... ({} chars truncated)",
            &s[..offset],
            s.chars().count() - max_len
        ),
        None => s.to_string(),
    }
}

/// Initialize logging system
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    info!("Logging system initialized");
    Ok(())
}
