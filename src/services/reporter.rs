//! Error reporting service
//!
//! Enriches captured faults, drops near-identical repeats and delivers
//! the survivors to the error-ingestion endpoint on a best-effort basis

use crate::config::Settings;
use crate::models::report::{DeviceInfo, ErrorReportPayload, RuntimeError};
use crate::utils::error::AppResult;
use crate::utils::stack::{dedup_key, parse_stack_location, truncate_trace};
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Last accepted report, used to suppress repeats
#[derive(Debug, Default)]
pub struct DedupState {
    last_error_hash: Option<String>,
    last_error_time: Option<Instant>,
}

impl DedupState {
    /// Record `key` at `now` unless it repeats the previous key inside `window`
    ///
    /// Returns `false` for a duplicate; the state is then left untouched.
    pub fn check_and_record(&mut self, key: &str, now: Instant, window: Duration) -> bool {
        if let (Some(last_hash), Some(last_time)) = (&self.last_error_hash, self.last_error_time) {
            if last_hash == key && now.saturating_duration_since(last_time) < window {
                return false;
            }
        }

        self.last_error_hash = Some(key.to_string());
        self.last_error_time = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_error_hash = None;
        self.last_error_time = None;
    }

    pub fn last_error_hash(&self) -> Option<&str> {
        self.last_error_hash.as_deref()
    }
}

/// Best-effort error reporter
///
/// Cloning is cheap; clones share the dedup state.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    client: Client,
    settings: Settings,
    dedup: Arc<Mutex<DedupState>>,
    runtime: Option<Handle>,
}

impl ErrorReporter {
    /// Create a new reporter
    ///
    /// Captures the current tokio runtime, if any, for detached delivery.
    pub fn new(settings: Settings) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("starterkit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            settings,
            dedup: Arc::new(Mutex::new(DedupState::default())),
            runtime: Handle::try_current().ok(),
        })
    }

    /// Use `handle` for detached delivery when called outside a runtime
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Whether reports will actually be sent
    pub fn is_enabled(&self) -> bool {
        self.settings.reporting.enabled && self.settings.is_configured()
    }

    /// Forget the last accepted report
    pub fn reset_dedup(&self) {
        self.lock_dedup().reset();
    }

    /// Report a fault
    ///
    /// Never fails: an unconfigured reporter, a duplicate, a transport error
    /// and a rejected report all end here silently (the last two with a warning).
    pub async fn report_error(&self, error: RuntimeError) {
        let (Some(project_id), Some(api_url)) = (self.settings.project_id(), self.settings.api_url())
        else {
            debug!("Error reporting not configured, skipping report");
            return;
        };
        if !self.settings.reporting.enabled {
            return;
        }

        let mut error = error;
        enrich_location(&mut error);

        let key = dedup_key(&error.message, error.filename.as_deref(), error.line_number);
        let accepted =
            self.lock_dedup()
                .check_and_record(&key, Instant::now(), self.settings.dedup_window());
        if !accepted {
            debug!("Dropping duplicate error report: {}", key);
            return;
        }

        error.stack = error.stack.as_deref().map(truncate_trace);
        error.component_stack = error.component_stack.as_deref().map(truncate_trace);

        let error_type = error.error_type;
        let payload = ErrorReportPayload {
            project_id: project_id.to_string(),
            error,
            device_info: DeviceInfo::current(self.settings.project.app_version.clone()),
        };

        let url = format!("{}/api/errors/report", api_url);
        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Error report delivered ({})", error_type);
            }
            Ok(response) => {
                warn!("Error report rejected: {}", response.status());
            }
            Err(e) => {
                warn!("Failed to send error report: {}", e);
            }
        }
    }

    /// Report without waiting, for synchronous capture sites
    ///
    /// Dropped when no tokio runtime is reachable.
    pub fn report_detached(&self, error: RuntimeError) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => match &self.runtime {
                Some(handle) => handle.clone(),
                None => {
                    debug!("No async runtime available, dropping error report");
                    return;
                }
            },
        };

        let reporter = self.clone();
        handle.spawn(async move {
            reporter.report_error(error).await;
        });
    }

    // Reporting runs inside panic hooks, so a poisoned lock must not panic again
    fn lock_dedup(&self) -> MutexGuard<'_, DedupState> {
        self.dedup.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Fill filename/line/column from the stack when the capture site did not
fn enrich_location(error: &mut RuntimeError) {
    if error.filename.is_some() {
        return;
    }
    let Some(location) = error.stack.as_deref().and_then(parse_stack_location) else {
        return;
    };

    error.filename = Some(location.filename);
    error.line_number = Some(location.line_number);
    error.column_number = Some(location.column_number);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::ErrorType;

    #[test]
    fn test_dedup_within_window() {
        let mut state = DedupState::default();
        let start = Instant::now();
        let window = Duration::from_secs(5);

        assert!(state.check_and_record("boom:a.rs:1", start, window));
        assert!(!state.check_and_record("boom:a.rs:1", start + Duration::from_secs(4), window));
        assert!(state.check_and_record("boom:a.rs:1", start + Duration::from_secs(5), window));
    }

    #[test]
    fn test_dedup_different_key() {
        let mut state = DedupState::default();
        let now = Instant::now();
        let window = Duration::from_secs(5);

        assert!(state.check_and_record("a", now, window));
        assert!(state.check_and_record("b", now, window));
        assert!(state.check_and_record("a", now, window));
        assert_eq!(state.last_error_hash(), Some("a"));
    }

    #[test]
    fn test_duplicate_leaves_state_unchanged() {
        let mut state = DedupState::default();
        let start = Instant::now();
        let window = Duration::from_secs(5);

        state.check_and_record("a", start, window);
        state.check_and_record("a", start + Duration::from_secs(3), window);

        // Window still measured from the first accepted report
        assert!(state.check_and_record("a", start + Duration::from_secs(6), window));
    }

    #[test]
    fn test_reset() {
        let mut state = DedupState::default();
        let now = Instant::now();

        state.check_and_record("a", now, Duration::from_secs(5));
        state.reset();

        assert!(state.last_error_hash().is_none());
        assert!(state.check_and_record("a", now, Duration::from_secs(5)));
    }

    #[test]
    fn test_enrich_location_from_stack() {
        let mut error = RuntimeError::new("boom", ErrorType::JsError).with_stack("at Foo (bar.tsx:12:3)");
        enrich_location(&mut error);

        assert_eq!(error.filename.as_deref(), Some("bar.tsx"));
        assert_eq!(error.line_number, Some(12));
        assert_eq!(error.column_number, Some(3));
    }

    #[test]
    fn test_enrich_keeps_existing_location() {
        let mut error = RuntimeError::new("boom", ErrorType::JsError)
            .with_stack("at Foo (bar.tsx:12:3)")
            .with_location("main.rs", 1, 1);
        enrich_location(&mut error);

        assert_eq!(error.filename.as_deref(), Some("main.rs"));
        assert_eq!(error.line_number, Some(1));
    }

    #[test]
    fn test_disabled_reporter() {
        let reporter = ErrorReporter::new(Settings::unconfigured()).unwrap();
        assert!(!reporter.is_enabled());

        let mut settings = Settings::for_project("proj", "http://127.0.0.1:9");
        settings.reporting.enabled = false;
        assert!(!ErrorReporter::new(settings).unwrap().is_enabled());
    }
}
