//! Global logging module for the evaluation engine
//!
//! Provides a process-wide logging service behind a `OnceLock` and the macro
//! support functions used by `log_error!` and friends. Every entry point is
//! safe to call before initialization; events are simply dropped.

pub mod codes;
pub mod events;
#[macro_use]
pub mod macros;
pub mod service;

use crate::config::LoggingPreferences;
use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
#[cfg(feature = "logging")]
pub use service::FacadeLogger;
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from preferences
pub fn init_global_logging(preferences: &LoggingPreferences) -> Result<(), String> {
    let service = Arc::new(LoggingService::with_preferences(
        preferences.min_log_level,
        preferences.use_structured_logging,
    ));
    init_global_logging_with_service(service)
}

/// Initialize with custom service (hosts bridging to `log`, tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Attach context and hand the event to the global logger, if any
pub fn log_with_context(event: LogEvent, context: Vec<(&str, String)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    if !logger.should_log(event.level) {
        return;
    }

    let event = context
        .into_iter()
        .fold(event, |event, (key, value)| event.with_context(key, &value));
    logger.log_event(event);
}

pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    log_with_context(LogEvent::error(code, message), context);
}

pub fn log_warning_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    log_with_context(LogEvent::warning_with_code(code, message), context);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    log_with_context(LogEvent::success(code, message), context);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, String)>) {
    log_with_context(LogEvent::info(message), context);
}

pub fn log_debug_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    log_with_context(LogEvent::debug_with_code(code, message), context);
}

// ============================================================================
// SAFE FALLBACK LOGGING
// ============================================================================

/// Error logging that falls back to stderr when uninitialized
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_do_not_panic_when_uninitialized() {
        log_error_with_context(
            codes::change::CORRUPTED_STATE,
            "corrupted",
            vec![("control_id", "FS".to_string())],
        );
        log_warning_with_context(codes::change::APPLY_FAILED, "apply failed", Vec::new());
        log_success_with_context(codes::success::CLEANUP_COMPLETED, "clean", Vec::new());
        log_info_with_context("info", Vec::new());
        log_debug_with_context(codes::evaluation::ASSESSMENT_NOT_APPLICABLE, "skip", Vec::new());
        safe_log_error(codes::system::INTERNAL_ERROR, "Test error");
    }

    #[test]
    fn test_global_logging_initializes_once() {
        let memory = Arc::new(MemoryLogger::new());
        let service = Arc::new(LoggingService::new(memory, LogLevel::Debug));

        // Another test in this binary may have won the race
        let first = init_global_logging_with_service(service);
        assert!(is_initialized());
        if first.is_ok() {
            let again = init_global_logging(&LoggingPreferences::default());
            assert_eq!(again, Err("Global logger already initialized".to_string()));
        }
        assert!(try_get_global_logger().is_some());
    }
}
