use super::{Scope, SinkStats, SinkStatsSnapshot};
use crate::domain::{Field, Level, LogEntry, Record};
use crate::logger::{Logger, SharedLogger};
use std::fmt::Write as _;
use std::sync::Arc;

/// Forwards entries to the `tracing` dispatcher active on the calling thread.
///
/// Dynamic keys cannot become tracing fields, so structured fields travel as one
/// `fields` string of `key=value` pairs.
#[derive(Clone)]
pub struct TracingLogger {
    scope: Scope,
    stats: Arc<SinkStats>,
}

impl TracingLogger {
    pub fn new(name: &str, min_level: Level) -> Self {
        Self {
            scope: Scope::root(name, min_level),
            stats: SinkStats::new(),
        }
    }

    pub fn with_fields(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            scope: self.scope.with_fields(fields),
            stats: self.stats.clone(),
        }
    }

    pub fn stats(&self) -> SinkStatsSnapshot {
        self.stats.snapshot()
    }
}

fn join_fields(fields: &[Field]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{field}");
    }
    out
}

macro_rules! forward_event {
    ($level:expr, $entry:expr, $fields:expr) => {
        tracing::event!(
            $level,
            logger = %$entry.logger,
            fields = %$fields,
            trace_id = $entry.trace_id.as_deref(),
            span_id = $entry.span_id.as_deref(),
            request_id = $entry.request_id.as_deref(),
            "{}",
            $entry.message
        )
    };
}

impl Logger for TracingLogger {
    fn log(&self, record: &Record<'_>) {
        let entry = LogEntry::capture(record, self.scope.name(), self.scope.fields());
        let fields = join_fields(&entry.fields);

        match entry.level {
            Level::Debug => forward_event!(tracing::Level::DEBUG, entry, fields),
            Level::Info => forward_event!(tracing::Level::INFO, entry, fields),
            Level::Warn => forward_event!(tracing::Level::WARN, entry, fields),
            Level::Error => forward_event!(tracing::Level::ERROR, entry, fields),
        }
        self.stats.record_emitted(1);
    }

    fn flush(&self) {
        self.stats.record_flush();
    }

    fn child(&self, name: &str) -> SharedLogger {
        Arc::new(Self {
            scope: self.scope.child(name),
            stats: self.stats.clone(),
        })
    }

    fn name(&self) -> &str {
        self.scope.name()
    }

    fn enabled(&self, level: Level) -> bool {
        self.scope.enabled(level)
    }
}
