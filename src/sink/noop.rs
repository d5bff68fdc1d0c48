use crate::domain::{Level, Record};
use crate::logger::{Logger, SharedLogger};
use std::sync::Arc;

/// Discards every entry. Children are no-op loggers as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl NoopLogger {
    pub fn shared() -> SharedLogger {
        Arc::new(NoopLogger)
    }
}

impl Logger for NoopLogger {
    fn log(&self, _record: &Record<'_>) {}

    fn flush(&self) {}

    fn child(&self, _name: &str) -> SharedLogger {
        Arc::new(NoopLogger)
    }

    fn enabled(&self, _level: Level) -> bool {
        false
    }
}
