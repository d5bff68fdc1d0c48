// Write entries to JSON lines files with size/time based rotation.
// Each entry is one ND-JSON line. When the current file exceeds the configured
// size or max age, a new file with a timestamp suffix is opened.

use super::{Scope, SinkStats, SinkStatsSnapshot};
use crate::domain::{Field, Level, LogEntry, LoggerError, Record};
use crate::logger::{Logger, SharedLogger};
use chrono::{DateTime, Duration as ChronoDuration, Local};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

const DEFAULT_MAX_SIZE_MB: u64 = 10;
const DEFAULT_MAX_AGE_HOURS: i64 = 12;

/// When the active file is replaced by a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRotation {
    pub max_size_bytes: u64,
    pub max_age: ChronoDuration,
}

impl Default for FileRotation {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_MB * 1024 * 1024,
            max_age: ChronoDuration::hours(DEFAULT_MAX_AGE_HOURS),
        }
    }
}

impl FileRotation {
    /// Rotation after `max_size_mb` megabytes or `max_age_hours` hours, both positive.
    pub fn new(max_size_mb: u64, max_age_hours: i64) -> Result<Self, LoggerError> {
        let max_size_bytes = max_size_mb
            .checked_mul(1024 * 1024)
            .filter(|bytes| *bytes > 0)
            .ok_or_else(|| {
                LoggerError::Config(format!(
                    "File sink max_size_mb must be between 1 and {}",
                    u64::MAX / (1024 * 1024)
                ))
            })?;
        let max_age = ChronoDuration::try_hours(max_age_hours)
            .filter(|age| *age > ChronoDuration::zero())
            .ok_or_else(|| {
                LoggerError::Config(format!(
                    "File sink max_age_hours {max_age_hours} is out of range"
                ))
            })?;
        Ok(Self {
            max_size_bytes,
            max_age,
        })
    }
}

struct ActiveFile {
    writer: BufWriter<File>,
    path: PathBuf,
    created_at: DateTime<Local>,
    written: u64,
}

struct FileInner {
    directory: PathBuf,
    base_name: String,
    rotation: FileRotation,
    active: Mutex<ActiveFile>,
    stats: Arc<SinkStats>,
}

/// JSON lines file logger.
///
/// Writes go through a `BufWriter`; `flush` drains it to the OS.
#[derive(Clone)]
pub struct FileLogger {
    scope: Scope,
    inner: Arc<FileInner>,
}

impl FileLogger {
    /// Opens a logger with default rotation (10 MB or 12 hours).
    pub fn open(path: impl AsRef<Path>, name: &str, min_level: Level) -> Result<Self, LoggerError> {
        Self::with_rotation(path, name, min_level, FileRotation::default())
    }

    pub fn with_rotation(
        path: impl AsRef<Path>,
        name: &str,
        min_level: Level,
        rotation: FileRotation,
    ) -> Result<Self, LoggerError> {
        let path = path.as_ref();
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "logs".to_string());

        std::fs::create_dir_all(&directory).map_err(|e| LoggerError::io(&directory, e))?;
        let active = open_new_log_file(&directory, &base_name)?;

        Ok(Self {
            scope: Scope::root(name, min_level),
            inner: Arc::new(FileInner {
                directory,
                base_name,
                rotation,
                active: Mutex::new(active),
                stats: SinkStats::new(),
            }),
        })
    }

    pub fn with_fields(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            scope: self.scope.with_fields(fields),
            inner: self.inner.clone(),
        }
    }

    /// Path of the file currently written to.
    pub fn active_path(&self) -> PathBuf {
        self.inner.active.lock().path.clone()
    }

    pub fn stats(&self) -> SinkStatsSnapshot {
        self.inner.stats.snapshot()
    }

    fn write_line(active: &mut ActiveFile, line: &str) -> Result<(), LoggerError> {
        let path = active.path.clone();
        let io_err = |e| LoggerError::io(&path, e);

        active.writer.write_all(line.as_bytes()).map_err(io_err)?;
        active.writer.write_all(b"\n").map_err(io_err)?;
        active.written += line.len() as u64 + 1;
        Ok(())
    }

    /// Swaps in a fresh file once the active one is too large or too old.
    fn rotate_if_needed(&self, active: &mut ActiveFile) -> Result<(), LoggerError> {
        let rotation = &self.inner.rotation;
        let need_rotate_size = active.written >= rotation.max_size_bytes;
        let need_rotate_time = Local::now() - active.created_at >= rotation.max_age;

        if need_rotate_size || need_rotate_time {
            active
                .writer
                .flush()
                .map_err(|e| LoggerError::io(&active.path, e))?;
            *active = open_new_log_file(&self.inner.directory, &self.inner.base_name)?;
        }

        Ok(())
    }
}

/// Opens `<base>_<YYYYmmdd_HHMMSS>.json`, adding `_<n>` when that name is taken.
fn open_new_log_file(dir: &Path, base_name: &str) -> Result<ActiveFile, LoggerError> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut attempt = 0_u32;

    loop {
        let filename = if attempt == 0 {
            format!("{base_name}_{timestamp}.json")
        } else {
            format!("{base_name}_{timestamp}_{attempt}.json")
        };
        let full_path = dir.join(filename);

        match OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&full_path)
        {
            Ok(file) => {
                return Ok(ActiveFile {
                    writer: BufWriter::new(file),
                    path: full_path,
                    created_at: Local::now(),
                    written: 0,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < 10_000 => {
                attempt += 1;
            }
            Err(e) => return Err(LoggerError::io(full_path, e)),
        }
    }
}

impl Logger for FileLogger {
    fn log(&self, record: &Record<'_>) {
        let entry = LogEntry::capture(record, self.scope.name(), self.scope.fields());
        let line = match entry.to_json() {
            Ok(line) => line,
            Err(e) => {
                self.inner.stats.record_failed();
                warn!(error = %e, "file logger failed to encode entry");
                return;
            }
        };

        let mut active = self.inner.active.lock();
        if let Err(e) = Self::write_line(&mut active, &line) {
            self.inner.stats.record_failed();
            warn!(error = %e, "file logger failed to write entry");
            return;
        }
        self.inner.stats.record_emitted(1);

        // The entry is already in the old file; a failed rotation keeps writing there.
        if let Err(e) = self.rotate_if_needed(&mut active) {
            self.inner.stats.record_failed();
            warn!(error = %e, path = %active.path.display(), "file logger failed to rotate");
        }
    }

    fn flush(&self) {
        let mut active = self.inner.active.lock();
        if let Err(e) = active.writer.flush() {
            self.inner.stats.record_failed();
            warn!(error = %e, path = %active.path.display(), "file logger flush failed");
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

impl Drop for FileInner {
    fn drop(&mut self) {
        let _ = self.active.get_mut().writer.flush();
    }
}
