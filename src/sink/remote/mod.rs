//! Batching HTTP shipper.
//!
//! Callers enqueue onto a bounded channel and return immediately. A dedicated
//! thread running a current-thread tokio runtime batches entries and POSTs them
//! as NDJSON, retrying with backoff and falling back per [`FallbackPolicy`].

pub mod encode;
pub mod retry;
mod worker;

pub use retry::RetryPolicy;

use super::{Scope, SinkStats, SinkStatsSnapshot};
use crate::domain::{Field, Level, LogEntry, LoggerError, Record};
use crate::logger::{Logger, SharedLogger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;
use worker::{Command, Worker};

const MAX_QUEUE_CAPACITY: usize = 10_000_000;

/// What happens to a batch once every delivery attempt failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Discard the batch and count it as dropped.
    Drop,
    /// Write the entries as JSON lines to stderr.
    #[default]
    Stderr,
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub queue_capacity: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Upper bound on how long `flush` waits for the worker.
    pub flush_timeout: Duration,
    pub compression: bool,
    pub retry: RetryPolicy,
    pub fallback: FallbackPolicy,
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9600/v1/aggregate".to_string(),
            batch_size: 500,
            flush_interval: Duration::from_millis(500),
            queue_capacity: 10_000,
            timeout: Duration::from_secs(5),
            flush_timeout: Duration::from_secs(10),
            compression: false,
            retry: RetryPolicy::default(),
            fallback: FallbackPolicy::default(),
            user_agent: format!("rask-logger/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RemoteConfig {
    pub fn validate(&self) -> Result<(), LoggerError> {
        let invalid_endpoint = |reason: String| LoggerError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason,
        };
        let url = Url::parse(&self.endpoint).map_err(|e| invalid_endpoint(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid_endpoint(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        if self.batch_size == 0 {
            return Err(LoggerError::Config("batch_size must be greater than 0".into()));
        }
        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(LoggerError::Config(format!(
                "queue_capacity must be between 1 and {MAX_QUEUE_CAPACITY}"
            )));
        }
        if self.flush_interval.is_zero() {
            return Err(LoggerError::Config("flush_interval must be greater than 0".into()));
        }
        if self.timeout.is_zero() {
            return Err(LoggerError::Config("timeout must be greater than 0".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(LoggerError::Config("max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

struct Shipper {
    entries_tx: mpsc::Sender<LogEntry>,
    control_tx: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
    thread: Option<JoinHandle<()>>,
    stats: Arc<SinkStats>,
    flush_timeout: Duration,
}

impl Drop for Shipper {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("remote logger worker panicked");
            }
        }
    }
}

/// Logger shipping entries to an HTTP collector.
///
/// Clones and children share one worker; it stops when the last handle is dropped,
/// after a final drain.
#[derive(Clone)]
pub struct RemoteLogger {
    scope: Scope,
    shipper: Arc<Shipper>,
}

impl RemoteLogger {
    pub fn spawn(name: &str, min_level: Level, config: RemoteConfig) -> Result<Self, LoggerError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LoggerError::Http(format!("Failed to build HTTP client: {e}")))?;

        let (entries_tx, entries_rx) = mpsc::channel(config.queue_capacity);
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let stats = SinkStats::new();
        let flush_timeout = config.flush_timeout;

        let worker = Worker::new(
            client,
            config,
            stats.clone(),
            entries_rx,
            control_rx,
            shutdown.clone(),
        );

        let thread = std::thread::Builder::new()
            .name("rask-logger-remote".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        warn!(error = %e, "remote logger could not start its runtime");
                        return;
                    }
                };
                runtime.block_on(worker.run());
            })
            .map_err(|e| LoggerError::Worker(format!("Failed to spawn worker thread: {e}")))?;

        Ok(Self {
            scope: Scope::root(name, min_level),
            shipper: Arc::new(Shipper {
                entries_tx,
                control_tx,
                shutdown,
                thread: Some(thread),
                stats,
                flush_timeout,
            }),
        })
    }

    pub fn with_fields(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            scope: self.scope.with_fields(fields),
            shipper: self.shipper.clone(),
        }
    }

    pub fn stats(&self) -> SinkStatsSnapshot {
        self.shipper.stats.snapshot()
    }
}

impl Logger for RemoteLogger {
    fn log(&self, record: &Record<'_>) {
        let entry = LogEntry::capture(record, self.scope.name(), self.scope.fields());
        match self.shipper.entries_tx.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.shipper.stats.record_dropped(1);
            }
            Err(TrySendError::Closed(_)) => {
                self.shipper.stats.record_dropped(1);
                warn!("remote logger worker is gone, entry dropped");
            }
        }
    }

    fn flush(&self) {
        let (ack_tx, ack_rx) = std::sync::mpsc::sync_channel(1);
        if self.shipper.control_tx.send(Command::Flush(ack_tx)).is_ok()
            && ack_rx.recv_timeout(self.shipper.flush_timeout).is_err()
        {
            warn!(
                timeout_ms = self.shipper.flush_timeout.as_millis() as u64,
                "remote logger flush did not complete in time"
            );
        }
        self.shipper.stats.record_flush();
    }

    fn child(&self, name: &str) -> SharedLogger {
        Arc::new(Self {
            scope: self.scope.child(name),
            shipper: self.shipper.clone(),
        })
    }

    fn name(&self) -> &str {
        self.scope.name()
    }

    fn enabled(&self, level: Level) -> bool {
        self.scope.enabled(level)
    }
}
