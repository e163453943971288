//! Error capture handlers module
//!
//! Contains the process-wide hooks and the render error boundary

pub mod boundary;
pub mod global;

pub use boundary::{ErrorBoundary, Rendered};
pub use global::{setup_global_error_handlers, GlobalErrorHandlers, HandlerChain};
