use crate::domain::{Level, Record};
use crate::logger::{Logger, SharedLogger};
use std::sync::Arc;

/// Dispatches every entry to several loggers.
///
/// Each inner logger applies its own level filter and scope; the fanout itself
/// only skips work when no inner logger wants the level.
#[derive(Clone)]
pub struct FanoutLogger {
    name: String,
    loggers: Vec<SharedLogger>,
}

impl FanoutLogger {
    pub fn new(name: &str, loggers: Vec<SharedLogger>) -> Self {
        Self {
            name: name.to_string(),
            loggers,
        }
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Logger for FanoutLogger {
    fn log(&self, record: &Record<'_>) {
        for logger in &self.loggers {
            if logger.enabled(record.level) {
                logger.log(&Record {
                    logger: logger.name(),
                    ..*record
                });
            }
        }
    }

    fn flush(&self) {
        for logger in &self.loggers {
            logger.flush();
        }
    }

    fn child(&self, name: &str) -> SharedLogger {
        let child_name = if self.name.is_empty() {
            name.to_string()
        } else if name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, name)
        };

        Arc::new(Self {
            name: child_name,
            loggers: self.loggers.iter().map(|l| l.child(name)).collect(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self, level: Level) -> bool {
        self.loggers.iter().any(|l| l.enabled(level))
    }
}
