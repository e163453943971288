//! Utilities module
//!
//! Contains error handling, logging and stack trace tools

pub mod error;
pub mod logging;
pub mod stack;
