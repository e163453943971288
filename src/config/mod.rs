//! Configuration management module
//!
//! Responsible for loading project settings from environment variables and configuration files

pub mod file;
pub mod settings;

pub use file::AppConfig;
pub use settings::{LoggingConfig, ProjectConfig, ReportingConfig, Settings};
