//! Starter kit client library
//!
//! Provides best-effort error reporting and typed AI API wrappers

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use handlers::{setup_global_error_handlers, ErrorBoundary, GlobalErrorHandlers, HandlerChain};
pub use models::report::{ErrorType, RuntimeError};
pub use services::{AiClient, ErrorReporter};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
