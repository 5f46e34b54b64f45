//! Logging service and logger sinks

use super::codes::Code;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service: one sink plus a minimum level
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Console or JSON-lines sink depending on `structured`
    pub fn with_preferences(min_level: LogLevel, structured: bool) -> Self {
        let logger: Arc<dyn Logger> = if structured {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger)
        };
        Self::new(logger, min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

/// Human-readable lines on stderr; stdout is left to reports
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", event.format());
    }
}

/// JSON lines on stderr for log shippers
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        let line = event.format_json().unwrap_or_else(|_| event.format());
        eprintln!("{}", line);
    }
}

/// Forwards events to the `log` facade so hosts can use any `log` backend
#[cfg(feature = "logging")]
pub struct FacadeLogger;

#[cfg(feature = "logging")]
impl Logger for FacadeLogger {
    fn log(&self, event: &LogEvent) {
        let level = match event.level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        };
        log::log!(target: "attest", level, "{}", event.format());
    }
}

/// Memory logger for testing
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_error() && e.code == code)
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        self.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);
        assert_eq!(service.min_level(), LogLevel::Warning);

        service.log_event(LogEvent::debug("dropped"));
        service.log_event(LogEvent::success(codes::success::CHANGE_APPLIED, "dropped"));
        service.log_event(LogEvent::warning_with_code(codes::change::APPLY_FAILED, "kept"));
        service.log_event(LogEvent::error(codes::change::REVERT_FAILED, "kept"));

        assert_eq!(memory.event_count(), 2);
        assert!(memory.has_error_with_code(codes::change::REVERT_FAILED));
        assert_eq!(memory.get_events_with_code(codes::change::APPLY_FAILED).len(), 1);
    }

    #[test]
    fn test_memory_logger_clear() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Debug);
        assert!(service.should_log(LogLevel::Debug));

        service.log_event(LogEvent::success(codes::success::CHANGE_REVERTED, "reverted"));
        assert_eq!(memory.get_events()[0].message, "reverted");

        memory.clear();
        assert_eq!(memory.event_count(), 0);
    }
}
