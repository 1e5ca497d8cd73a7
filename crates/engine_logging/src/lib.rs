#![deny(missing_docs)]
//! Shared logging utilities for the similarity workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every macro prefixes
//! its message with the id of the comparison run that is currently active.

use std::sync::atomic::{AtomicU64, Ordering};

/// Id of the comparison run currently owned by the engine; 0 before the first run.
static RUN_ID: AtomicU64 = AtomicU64::new(0);

/// Records the id of the run that subsequent log lines belong to.
/// Called by the engine coordinator each time a run starts.
pub fn set_run_id(run_id: u64) {
    RUN_ID.store(run_id, Ordering::Relaxed);
}

/// Retrieves the id of the current run.
/// Returns 0 if no run has been started.
pub fn run_id() -> u64 {
    RUN_ID.load(Ordering::Relaxed)
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("[run {}] {}", $crate::run_id(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("[run {}] {}", $crate::run_id(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("[run {}] {}", $crate::run_id(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("[run {}] {}", $crate::run_id(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("[run {}] {}", $crate::run_id(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
