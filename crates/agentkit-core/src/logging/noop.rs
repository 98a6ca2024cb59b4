//! Silent logger

use std::sync::Arc;

use super::traits::{Logger, SharedLogger};

/// Discards every record; the default when no logger is injected
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn shared() -> SharedLogger {
        Arc::new(NoOpLogger)
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
