//! In-memory logger that keeps every record

use parking_lot::Mutex;

use super::traits::{LogLevel, Logger};

/// A captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that stores records instead of printing them
///
/// Useful for asserting on warnings emitted by components that never
/// surface those conditions as errors.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Whether any record at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_captured_in_order() {
        let logger = MemoryLogger::new();
        logger.info("first");
        logger.warn("second");
        logger.log(LogLevel::Error, "third");

        let records = logger.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].level, LogLevel::Warn);
        assert_eq!(logger.messages(LogLevel::Error), vec!["third".to_string()]);
        assert!(logger.contains(LogLevel::Warn, "sec"));
        assert!(!logger.contains(LogLevel::Info, "sec"));

        logger.clear();
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_format_macros() {
        let logger = MemoryLogger::new();
        crate::log_warn!(logger, "server {} skipped", "weather");
        assert!(logger.contains(LogLevel::Warn, "server weather skipped"));
    }
}
