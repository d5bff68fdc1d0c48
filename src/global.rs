//! Process-wide logger.

use crate::domain::LoggerError;
use crate::logger::SharedLogger;
use crate::sink::NoopLogger;
use std::sync::OnceLock;

static GLOBAL: OnceLock<SharedLogger> = OnceLock::new();

/// Installs the process-wide logger. Only the first call succeeds.
pub fn install(logger: SharedLogger) -> Result<(), LoggerError> {
    GLOBAL.set(logger).map_err(|_| LoggerError::AlreadyInstalled)
}

/// The installed logger, or a [`NoopLogger`] before [`install`] ran.
pub fn global() -> SharedLogger {
    GLOBAL.get().cloned().unwrap_or_else(NoopLogger::shared)
}

pub fn is_installed() -> bool {
    GLOBAL.get().is_some()
}
