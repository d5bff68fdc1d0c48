use super::encode::{EncodedBatch, encode_batch};
use super::{FallbackPolicy, RemoteConfig};
use crate::domain::LogEntry;
use crate::sink::SinkStats;
use reqwest::Client;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub(crate) enum Command {
    /// Ship everything queued so far, then acknowledge.
    Flush(std::sync::mpsc::SyncSender<()>),
}

pub(crate) struct Worker {
    client: Client,
    config: RemoteConfig,
    stats: Arc<SinkStats>,
    entries_rx: mpsc::Receiver<LogEntry>,
    control_rx: mpsc::UnboundedReceiver<Command>,
    shutdown: CancellationToken,
    pending: Vec<LogEntry>,
}

impl Worker {
    pub(crate) fn new(
        client: Client,
        config: RemoteConfig,
        stats: Arc<SinkStats>,
        entries_rx: mpsc::Receiver<LogEntry>,
        control_rx: mpsc::UnboundedReceiver<Command>,
        shutdown: CancellationToken,
    ) -> Self {
        let capacity = config.batch_size;
        Self {
            client,
            config,
            stats,
            entries_rx,
            control_rx,
            shutdown,
            pending: Vec::with_capacity(capacity),
        }
    }

    pub(crate) async fn run(mut self) {
        let period = self.config.flush_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    self.drain_queue();
                    self.ship_pending().await;
                    break;
                }
                Some(command) = self.control_rx.recv() => match command {
                    Command::Flush(ack) => {
                        self.drain_queue();
                        self.ship_pending().await;
                        let _ = ack.send(());
                    }
                },
                received = self.entries_rx.recv() => match received {
                    Some(entry) => {
                        self.pending.push(entry);
                        if self.pending.len() >= self.config.batch_size {
                            self.ship_pending().await;
                        }
                    }
                    None => {
                        self.ship_pending().await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if !self.pending.is_empty() {
                        self.ship_pending().await;
                    }
                }
            }
        }

        debug!("remote logger worker stopped");
    }

    fn drain_queue(&mut self) {
        while let Ok(entry) = self.entries_rx.try_recv() {
            self.pending.push(entry);
        }
    }

    async fn ship_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        for chunk in pending.chunks(self.config.batch_size) {
            self.ship(chunk).await;
        }
    }

    async fn ship(&self, entries: &[LogEntry]) {
        let batch = match encode_batch(entries, self.config.compression) {
            Ok(batch) => batch,
            Err(e) => {
                self.stats.record_failed();
                warn!(error = %e, "remote logger failed to encode batch");
                self.give_up(entries);
                return;
            }
        };

        let mut attempt = 1;
        loop {
            match self.send(&batch).await {
                Ok(()) => {
                    self.stats.record_emitted(batch.entry_count as u64);
                    debug!(batch_id = %batch.id, entries = batch.entry_count, attempt, "batch shipped");
                    return;
                }
                Err(reason) => {
                    self.stats.record_failed();
                    warn!(batch_id = %batch.id, attempt, %reason, "remote logger delivery failed");
                }
            }

            if !self.config.retry.should_retry(attempt) {
                break;
            }
            let delay = self.config.retry.delay_for(attempt);
            // Shutdown cuts the wait short; the remaining attempts still run.
            tokio::select! {
                () = sleep(delay) => {}
                () = self.shutdown.cancelled() => {}
            }
            attempt += 1;
        }

        self.give_up(entries);
    }

    async fn send(&self, batch: &EncodedBatch) -> Result<(), String> {
        let mut request = self
            .client
            .post(self.config.endpoint.as_str())
            .header(CONTENT_TYPE, "application/x-ndjson")
            .header("X-Batch-Id", batch.id.as_str())
            .body(batch.body.clone());
        if batch.compressed {
            request = request.header(CONTENT_ENCODING, "gzip");
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("HTTP status {}", status.as_u16()))
        }
    }

    fn give_up(&self, entries: &[LogEntry]) {
        let count = entries.len() as u64;
        match self.config.fallback {
            FallbackPolicy::Drop => self.stats.record_dropped(count),
            FallbackPolicy::Stderr => {
                let mut stderr = std::io::stderr().lock();
                for entry in entries {
                    let line = entry.to_json().unwrap_or_else(|_| entry.to_text());
                    if writeln!(stderr, "{line}").is_err() {
                        self.stats.record_dropped(count);
                        return;
                    }
                }
                self.stats.record_fallback(count);
            }
        }
    }
}
