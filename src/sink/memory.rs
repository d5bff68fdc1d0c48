use super::{Scope, SinkStats, SinkStatsSnapshot};
use crate::domain::{Field, Level, LogEntry, Record};
use crate::logger::{Logger, SharedLogger};
use parking_lot::Mutex;
use std::sync::Arc;

/// Test double that keeps every entry in memory.
///
/// The buffer is shared by the logger and all of its children, so a test can hand out
/// children freely and assert on one place.
#[derive(Clone)]
pub struct MemoryLogger {
    scope: Scope,
    entries: Arc<Mutex<Vec<LogEntry>>>,
    stats: Arc<SinkStats>,
}

impl MemoryLogger {
    pub fn new(name: &str) -> Self {
        Self::with_level(name, Level::Debug)
    }

    pub fn with_level(name: &str, min_level: Level) -> Self {
        Self {
            scope: Scope::root(name, min_level),
            entries: Arc::new(Mutex::new(Vec::new())),
            stats: SinkStats::new(),
        }
    }

    pub fn with_fields(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            scope: self.scope.with_fields(fields),
            ..self.clone()
        }
    }

    /// Typed child, sharing the same buffer.
    pub fn scoped(&self, name: &str) -> Self {
        Self {
            scope: self.scope.child(name),
            ..self.clone()
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Removes and returns everything captured so far.
    pub fn take(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush_count(&self) -> u64 {
        self.stats.snapshot().flushes
    }

    pub fn stats(&self) -> SinkStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, record: &Record<'_>) {
        let entry = LogEntry::capture(record, self.scope.name(), self.scope.fields());
        self.entries.lock().push(entry);
        self.stats.record_emitted(1);
    }

    fn flush(&self) {
        self.stats.record_flush();
    }

    fn child(&self, name: &str) -> SharedLogger {
        Arc::new(self.scoped(name))
    }

    fn name(&self) -> &str {
        self.scope.name()
    }

    fn enabled(&self, level: Level) -> bool {
        self.scope.enabled(level)
    }
}
