//! Stack trace helpers
//!
//! Location recovery, trace truncation and dedup keys for error reports

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Maximum number of characters kept from a stack or component stack
pub const MAX_TRACE_LENGTH: usize = 5000;

/// Appended to a trace that was cut
pub const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// Identical reports inside this window are dropped
pub const DEDUP_WINDOW: Duration = Duration::from_secs(5);

// Tried in order: `at fn (file:line:col)`, `at file:line:col`, `file:line:col`
static LOCATION_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"at\s+.+?\s+\((.+?):(\d+):(\d+)\)").expect("valid regex"),
        Regex::new(r"at\s+(.+?):(\d+):(\d+)").expect("valid regex"),
        Regex::new(r"([^\s()]+):(\d+):(\d+)").expect("valid regex"),
    ]
});

/// Source location recovered from a stack trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLocation {
    pub filename: String,
    pub line_number: u32,
    pub column_number: u32,
}

/// Recover the fault location from the first line of a stack trace
///
/// Returns `None` when no pattern matches.
pub fn parse_stack_location(stack: &str) -> Option<StackLocation> {
    let first_line = stack.lines().next()?;

    LOCATION_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(first_line)?;
        Some(StackLocation {
            filename: captures.get(1)?.as_str().to_string(),
            line_number: captures.get(2)?.as_str().parse().ok()?,
            column_number: captures.get(3)?.as_str().parse().ok()?,
        })
    })
}

/// Cut a trace to `MAX_TRACE_LENGTH` characters and append the marker when cut
pub fn truncate_trace(trace: &str) -> String {
    match trace.char_indices().nth(MAX_TRACE_LENGTH) {
        Some((byte_offset, _)) => format!("{}{}", &trace[..byte_offset], TRUNCATION_MARKER),
        None => trace.to_string(),
    }
}

/// Key identifying structurally identical reports
pub fn dedup_key(message: &str, filename: Option<&str>, line_number: Option<u32>) -> String {
    format!(
        "{}:{}:{}",
        message,
        filename.unwrap_or("unknown"),
        line_number.unwrap_or(0)
    )
}
