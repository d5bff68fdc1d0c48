//! Concrete `Logger` implementations.
//!
//! Every implementation carries a [`Scope`] (name, minimum level, inherited fields)
//! and a [`SinkStats`] block; children share the parent's backend and stats.

pub mod console;
pub mod fanout;
pub mod file;
pub mod memory;
pub mod noop;
pub mod remote;
pub mod tracing_bridge;

pub use console::{ConsoleLogger, ConsoleTarget, Format};
pub use fanout::FanoutLogger;
pub use file::{FileLogger, FileRotation};
pub use memory::MemoryLogger;
pub use noop::NoopLogger;
pub use remote::{FallbackPolicy, RemoteConfig, RemoteLogger, RetryPolicy};
pub use tracing_bridge::TracingLogger;

use crate::domain::{Field, Level};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Attribution and filtering state inherited from parent to child.
#[derive(Debug, Clone)]
pub struct Scope {
    name: Arc<str>,
    min_level: Level,
    fields: Arc<[Field]>,
}

impl Scope {
    pub fn root(name: &str, min_level: Level) -> Self {
        Self {
            name: Arc::from(name),
            min_level,
            fields: Arc::from(Vec::new()),
        }
    }

    /// Child scope named `parent.name`; empty parts are skipped.
    pub fn child(&self, name: &str) -> Self {
        let joined = match (self.name.is_empty(), name.is_empty()) {
            (_, true) => self.name.clone(),
            (true, false) => Arc::from(name),
            (false, false) => Arc::from(format!("{}.{}", self.name, name)),
        };
        Self {
            name: joined,
            min_level: self.min_level,
            fields: self.fields.clone(),
        }
    }

    pub fn with_fields(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        let mut merged = self.fields.to_vec();
        merged.extend(fields);
        Self {
            name: self.name.clone(),
            min_level: self.min_level,
            fields: Arc::from(merged),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }
}

/// Lock-free counters shared by a logger and all of its children.
#[derive(Debug, Default)]
pub struct SinkStats {
    emitted: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
    fallback: AtomicU64,
    flushes: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkStatsSnapshot {
    /// Entries handed to the backend successfully.
    pub emitted: u64,
    /// Entries discarded on purpose (full queue, exhausted retries with drop policy).
    pub dropped: u64,
    /// Backend errors absorbed (write, serialization, transport).
    pub failed: u64,
    /// Entries written to the local fallback stream after the backend gave up.
    pub fallback: u64,
    pub flushes: u64,
}

impl SinkStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_emitted(&self, count: u64) {
        self.emitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, count: u64) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self, count: u64) {
        self.fallback.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SinkStatsSnapshot {
        SinkStatsSnapshot {
            emitted: self.emitted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_child_names() {
        let root = Scope::root("app", Level::Info);
        assert_eq!(root.child("worker").name(), "app.worker");
        assert_eq!(root.child("worker").child("io").name(), "app.worker.io");
        assert_eq!(root.child("").name(), "app");

        let anonymous = Scope::root("", Level::Info);
        assert_eq!(anonymous.child("worker").name(), "worker");
    }

    #[test]
    fn test_scope_child_inherits_level_and_fields() {
        let root = Scope::root("app", Level::Warn).with_fields([Field::new("region", "eu")]);
        let child = root.child("db");

        assert_eq!(child.min_level(), Level::Warn);
        assert_eq!(child.fields(), &[Field::new("region", "eu")]);
        assert!(!child.enabled(Level::Info));
        assert!(child.enabled(Level::Error));
    }

    #[test]
    fn test_scope_with_fields_appends() {
        let scope = Scope::root("app", Level::Debug)
            .with_fields([Field::new("a", 1)])
            .with_fields([Field::new("b", 2)]);
        let keys: Vec<_> = scope.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = SinkStats::new();
        stats.record_emitted(3);
        stats.record_dropped(1);
        stats.record_failed();
        stats.record_fallback(2);
        stats.record_flush();

        assert_eq!(
            stats.snapshot(),
            SinkStatsSnapshot {
                emitted: 3,
                dropped: 1,
                failed: 1,
                fallback: 2,
                flushes: 1,
            }
        );
    }
}
