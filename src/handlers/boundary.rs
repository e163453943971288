//! Render error boundary
//!
//! Wraps a rendering closure; the first fault is reported and the
//! boundary stays on its fallback until explicitly reset

use super::global::panic_message;
use crate::models::report::{ErrorType, RuntimeError};
use crate::services::ErrorReporter;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

thread_local! {
    // Nesting depth of boundary renders on this thread
    static BOUNDARY_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Whether the current thread is rendering inside an [`ErrorBoundary`]
///
/// Panics raised there belong to the boundary, not to the global hook.
pub fn inside_boundary() -> bool {
    BOUNDARY_DEPTH.with(|depth| depth.get() > 0)
}

/// Marks the current thread as inside a boundary until dropped
struct BoundaryScope;

impl BoundaryScope {
    fn enter() -> Self {
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get() + 1));
        BoundaryScope
    }
}

impl Drop for BoundaryScope {
    fn drop(&mut self) {
        BOUNDARY_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Outcome of [`ErrorBoundary::render`]
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<T> {
    /// The subtree rendered normally
    Content(T),
    /// The boundary is showing its fallback
    Fallback { message: String },
}

impl<T> Rendered<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Rendered::Fallback { .. })
    }

    pub fn into_content(self) -> Option<T> {
        match self {
            Rendered::Content(content) => Some(content),
            Rendered::Fallback { .. } => None,
        }
    }
}

/// Stateful wrapper around one UI subtree
#[derive(Debug)]
pub struct ErrorBoundary {
    reporter: ErrorReporter,
    component_stack: String,
    error: Option<String>,
}

impl ErrorBoundary {
    /// `component_stack` names the wrapped subtree in reports
    pub fn new(reporter: ErrorReporter, component_stack: impl Into<String>) -> Self {
        Self {
            reporter,
            component_stack: component_stack.into(),
            error: None,
        }
    }

    /// Render the subtree unless the boundary already failed
    ///
    /// An `Err` or a panic from `subtree` is reported as a render error
    /// and flips the boundary to its fallback.
    pub fn render<T, E, F>(&mut self, subtree: F) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        if let Some(message) = &self.error {
            return Rendered::Fallback {
                message: message.clone(),
            };
        }

        let outcome = {
            let _scope = BoundaryScope::enter();
            panic::catch_unwind(AssertUnwindSafe(subtree))
        };

        let (message, stack) = match outcome {
            Ok(Ok(content)) => return Rendered::Content(content),
            Ok(Err(e)) => {
                let backtrace = Backtrace::capture();
                let stack = (backtrace.status() == BacktraceStatus::Captured)
                    .then(|| backtrace.to_string());
                (e.to_string(), stack)
            }
            Err(payload) => (panic_message(&*payload), None),
        };

        warn!("Render error caught in {}: {}", self.component_stack, message);

        let mut error = RuntimeError::new(message.clone(), ErrorType::ReactError)
            .with_component_stack(self.component_stack.clone());
        error.stack = stack;
        self.reporter.report_detached(error);

        self.error = Some(message.clone());
        Rendered::Fallback { message }
    }

    /// User-initiated return to normal rendering
    pub fn reset(&mut self) {
        self.error = None;
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
