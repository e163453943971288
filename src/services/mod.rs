//! Services module
//!
//! Contains the error reporter and the AI HTTP client

pub mod ai_client;
pub mod reporter;

pub use ai_client::AiClient;
pub use reporter::{DedupState, ErrorReporter};
