#![deny(missing_docs)]
//! Shared logging utilities for the charsearch workspace.
//!
//! This crate provides the `search_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the search generation active on the logging thread, so that
//! log lines from a stale search can be told apart from the current one.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the search generation being processed.
    static SEARCH_GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Sets the search generation for the current thread.
/// The UI loop calls this after each state update.
pub fn set_search_generation(generation: u64) {
    SEARCH_GENERATION.with(|v| v.set(generation));
}

/// Retrieves the search generation for the current thread.
/// Returns 0 if no search has started on this thread.
pub fn search_generation() -> u64 {
    SEARCH_GENERATION.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! search_trace {
    ($($arg:tt)*) => {{
        log::trace!("[gen {}] {}", $crate::search_generation(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! search_info {
    ($($arg:tt)*) => {{
        log::info!("[gen {}] {}", $crate::search_generation(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! search_debug {
    ($($arg:tt)*) => {{
        log::debug!("[gen {}] {}", $crate::search_generation(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! search_warn {
    ($($arg:tt)*) => {{
        log::warn!("[gen {}] {}", $crate::search_generation(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! search_error {
    ($($arg:tt)*) => {{
        log::error!("[gen {}] {}", $crate::search_generation(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{search_generation, set_search_generation};

    #[test]
    fn generation_is_thread_local() {
        set_search_generation(7);
        assert_eq!(search_generation(), 7);

        let other = std::thread::spawn(search_generation).join().unwrap();
        assert_eq!(other, 0);
    }

    #[test]
    fn macros_expand_without_logger() {
        set_search_generation(3);
        crate::search_info!("page {} loaded", 2);
        crate::search_warn!("slow response");
    }
}
