use super::{Scope, SinkStats, SinkStatsSnapshot};
use crate::domain::{Field, Level, LogEntry, Record};
use crate::logger::{Logger, SharedLogger};
use clap::ValueEnum;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::warn;

/// Line layout of console and CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl Format {
    pub(crate) fn render(self, entry: &LogEntry) -> Result<String, serde_json::Error> {
        match self {
            Format::Text => Ok(entry.to_text()),
            Format::Json => entry.to_json(),
        }
    }
}

/// Which standard stream receives entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
    /// `Warn` and `Error` go to stderr, everything else to stdout.
    #[default]
    Split,
}

type BoxedWriter = Box<dyn Write + Send>;

struct Writers {
    out: BoxedWriter,
    err: BoxedWriter,
}

struct ConsoleInner {
    format: Format,
    target: ConsoleTarget,
    writers: Mutex<Writers>,
    stats: Arc<SinkStats>,
}

/// Writes one line per entry to the standard streams (or injected writers).
#[derive(Clone)]
pub struct ConsoleLogger {
    scope: Scope,
    inner: Arc<ConsoleInner>,
}

impl ConsoleLogger {
    pub fn new(name: &str, min_level: Level, format: Format, target: ConsoleTarget) -> Self {
        Self::with_writers(
            name,
            min_level,
            format,
            target,
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// Console logger writing everything to a single writer.
    pub fn with_writer<W>(name: &str, min_level: Level, format: Format, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::with_writers(
            name,
            min_level,
            format,
            ConsoleTarget::Stdout,
            Box::new(writer),
            Box::new(io::sink()),
        )
    }

    pub fn with_writers(
        name: &str,
        min_level: Level,
        format: Format,
        target: ConsoleTarget,
        out: BoxedWriter,
        err: BoxedWriter,
    ) -> Self {
        Self {
            scope: Scope::root(name, min_level),
            inner: Arc::new(ConsoleInner {
                format,
                target,
                writers: Mutex::new(Writers { out, err }),
                stats: SinkStats::new(),
            }),
        }
    }

    pub fn with_fields(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            scope: self.scope.with_fields(fields),
            inner: self.inner.clone(),
        }
    }

    pub fn stats(&self) -> SinkStatsSnapshot {
        self.inner.stats.snapshot()
    }

    fn uses_stderr(&self, level: Level) -> bool {
        match self.inner.target {
            ConsoleTarget::Stdout => false,
            ConsoleTarget::Stderr => true,
            ConsoleTarget::Split => level >= Level::Warn,
        }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, record: &Record<'_>) {
        let entry = LogEntry::capture(record, self.scope.name(), self.scope.fields());
        let mut line = match self.inner.format.render(&entry) {
            Ok(line) => line,
            Err(e) => {
                self.inner.stats.record_failed();
                warn!(error = %e, "console logger failed to serialize entry");
                return;
            }
        };
        line.push('\n');

        let to_stderr = self.uses_stderr(entry.level);
        let result = {
            let mut writers = self.inner.writers.lock();
            let writer = if to_stderr {
                &mut writers.err
            } else {
                &mut writers.out
            };
            writer.write_all(line.as_bytes())
        };

        match result {
            Ok(()) => self.inner.stats.record_emitted(1),
            Err(e) => {
                self.inner.stats.record_failed();
                warn!(error = %e, "console logger write failed, entry dropped");
            }
        }
    }

    fn flush(&self) {
        let mut writers = self.inner.writers.lock();
        if let Err(e) = writers.out.flush().and_then(|()| writers.err.flush()) {
            self.inner.stats.record_failed();
            warn!(error = %e, "console logger flush failed");
        }
        self.inner.stats.record_flush();
    }

    fn child(&self, name: &str) -> SharedLogger {
        Arc::new(Self {
            scope: self.scope.child(name),
            inner: self.inner.clone(),
        })
    }

    fn name(&self) -> &str {
        self.scope.name()
    }

    fn enabled(&self, level: Level) -> bool {
        self.scope.enabled(level)
    }
}
