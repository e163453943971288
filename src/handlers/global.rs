//! Global error hooks
//!
//! Routes uncaught panics and failed background tasks to an ordered chain
//! of handlers, the error reporter being one of them

use super::boundary::inside_boundary;
use crate::models::report::{ErrorType, RuntimeError};
use crate::services::ErrorReporter;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::future::Future;
use std::panic;
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A handler receiving every captured fault
pub type ErrorHandler = Arc<dyn Fn(&RuntimeError) + Send + Sync>;

/// Ordered list of error handlers
///
/// Every fault goes to every handler, in registration order.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Arc<RwLock<Vec<ErrorHandler>>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler after all existing ones
    pub fn register<F>(&self, handler: F)
    where
        F: Fn(&RuntimeError) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.push(Arc::new(handler));
    }

    /// Hand `error` to every handler
    pub fn dispatch(&self, error: &RuntimeError) {
        // Snapshot so a handler may register further handlers without deadlocking
        let handlers: Vec<ErrorHandler> = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        for handler in handlers {
            handler(error);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn a task whose `Err` outcome is dispatched as an unhandled failure
    ///
    /// The handle resolves to `None` when the task failed.
    pub fn spawn_reported<F, T, E>(&self, future: F) -> JoinHandle<Option<T>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let chain = self.clone();
        tokio::spawn(async move {
            match future.await {
                Ok(value) => Some(value),
                Err(e) => {
                    chain.dispatch(&RuntimeError::new(e.to_string(), ErrorType::UnhandledPromise));
                    None
                }
            }
        })
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.len())
            .finish()
    }
}

/// Process-wide capture sources wired to a reporter
#[derive(Debug)]
pub struct GlobalErrorHandlers {
    chain: HandlerChain,
}

static INSTALLED: OnceCell<GlobalErrorHandlers> = OnceCell::new();

/// Install the process-wide panic hook and reporter handler
///
/// Returns `None` without touching any hook when `reporter` is disabled.
/// Only the first successful call installs; later calls return the same instance.
pub fn setup_global_error_handlers(reporter: &ErrorReporter) -> Option<&'static GlobalErrorHandlers> {
    if !reporter.is_enabled() {
        debug!("Error reporting disabled, global handlers not installed");
        return None;
    }

    Some(INSTALLED.get_or_init(|| GlobalErrorHandlers::install(reporter.clone())))
}

impl GlobalErrorHandlers {
    fn install(reporter: ErrorReporter) -> Self {
        let chain = HandlerChain::new();
        chain.register(move |error| reporter.report_detached(error.clone()));

        // The hook that was there before keeps running first
        let previous = panic::take_hook();
        let panic_chain = chain.clone();
        panic::set_hook(Box::new(move |info| {
            previous(info);

            // An enclosing boundary catches and reports this panic itself
            if inside_boundary() {
                return;
            }

            let mut error = RuntimeError::new(panic_message(info.payload()), ErrorType::JsError)
                .with_stack(Backtrace::force_capture().to_string());
            if let Some(location) = info.location() {
                error = error.with_location(location.file(), location.line(), location.column());
            }
            panic_chain.dispatch(&error);
        }));

        info!("Global error handlers installed");
        Self { chain }
    }

    /// Append an application handler after the reporter
    pub fn register<F>(&self, handler: F)
    where
        F: Fn(&RuntimeError) + Send + Sync + 'static,
    {
        self.chain.register(handler);
    }

    /// Dispatch a fault captured elsewhere
    pub fn capture(&self, error: RuntimeError) {
        self.chain.dispatch(&error);
    }

    /// See [`HandlerChain::spawn_reported`]
    pub fn spawn_reported<F, T, E>(&self, future: F) -> JoinHandle<Option<T>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        self.chain.spawn_reported(future)
    }

    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }
}

/// Human readable panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic".to_string()
    }
}
