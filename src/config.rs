use crate::domain::{Level, LoggerError};
use crate::logger::SharedLogger;
use crate::sink::{
    ConsoleLogger, ConsoleTarget, FallbackPolicy, FanoutLogger, FileLogger, FileRotation, Format,
    MemoryLogger, NoopLogger, RemoteConfig, RemoteLogger, RetryPolicy, TracingLogger,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn default_name() -> String {
    "app".to_string()
}

/// Top-level logger configuration, usually loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig::Console {
        target: ConsoleTarget::default(),
        format: Format::default(),
    }]
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            level: Level::default(),
            sinks: default_sinks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum SinkConfig {
    Console {
        #[serde(default)]
        target: ConsoleTarget,
        #[serde(default)]
        format: Format,
    },
    File {
        path: PathBuf,
        #[serde(default = "default_max_size_mb")]
        max_size_mb: u64,
        #[serde(default = "default_max_age_hours")]
        max_age_hours: i64,
    },
    Remote(RemoteSinkConfig),
    Tracing,
    Memory,
    Noop,
}

fn default_max_size_mb() -> u64 {
    10
}

fn default_max_age_hours() -> i64 {
    12
}

/// Remote sink settings with millisecond durations, as written in config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteSinkConfig {
    pub endpoint: String,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub queue_capacity: usize,
    pub timeout_ms: u64,
    pub flush_timeout_ms: u64,
    pub compression: bool,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
    pub fallback: FallbackPolicy,
}

impl Default for RemoteSinkConfig {
    fn default() -> Self {
        RemoteSinkConfig::from(&RemoteConfig::default())
    }
}

impl From<&RemoteConfig> for RemoteSinkConfig {
    fn from(config: &RemoteConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            batch_size: config.batch_size,
            flush_interval_ms: config.flush_interval.as_millis() as u64,
            queue_capacity: config.queue_capacity,
            timeout_ms: config.timeout.as_millis() as u64,
            flush_timeout_ms: config.flush_timeout.as_millis() as u64,
            compression: config.compression,
            max_attempts: config.retry.max_attempts,
            base_delay_ms: config.retry.base_delay.as_millis() as u64,
            max_delay_ms: config.retry.max_delay.as_millis() as u64,
            jitter: config.retry.jitter,
            fallback: config.fallback,
        }
    }
}

impl RemoteSinkConfig {
    pub fn to_remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            endpoint: self.endpoint.clone(),
            batch_size: self.batch_size,
            flush_interval: Duration::from_millis(self.flush_interval_ms),
            queue_capacity: self.queue_capacity,
            timeout: Duration::from_millis(self.timeout_ms),
            flush_timeout: Duration::from_millis(self.flush_timeout_ms),
            compression: self.compression,
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                base_delay: Duration::from_millis(self.base_delay_ms),
                max_delay: Duration::from_millis(self.max_delay_ms),
                jitter: self.jitter,
            },
            fallback: self.fallback,
            ..RemoteConfig::default()
        }
    }
}

impl LoggerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, LoggerError> {
        let config: LoggerConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoggerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LoggerError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, LoggerError> {
        toml::to_string(self).map_err(|e| LoggerError::Config(e.to_string()))
    }

    /// Applies `LOG_LEVEL`, `LOG_FORMAT` and `LOG_NAME` read through `lookup`.
    ///
    /// `LOG_FORMAT` rewrites the format of every console sink.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), LoggerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("LOG_LEVEL") {
            self.level = level.parse()?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            let format = match format.trim().to_lowercase().as_str() {
                "text" => Format::Text,
                "json" => Format::Json,
                other => {
                    return Err(LoggerError::Config(format!(
                        "Invalid LOG_FORMAT '{other}'. Valid formats: text, json"
                    )));
                }
            };
            for sink in &mut self.sinks {
                if let SinkConfig::Console { format: current, .. } = sink {
                    *current = format;
                }
            }
        }
        if let Some(name) = lookup("LOG_NAME") {
            self.name = name;
        }
        Ok(())
    }

    pub fn apply_process_env(&mut self) -> Result<(), LoggerError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        for sink in &self.sinks {
            match sink {
                SinkConfig::File {
                    path,
                    max_size_mb,
                    max_age_hours,
                } => {
                    if path.as_os_str().is_empty() {
                        return Err(LoggerError::Config("File sink path cannot be empty".into()));
                    }
                    FileRotation::new(*max_size_mb, *max_age_hours)?;
                }
                SinkConfig::Remote(remote) => remote.to_remote_config().validate()?,
                SinkConfig::Console { .. }
                | SinkConfig::Tracing
                | SinkConfig::Memory
                | SinkConfig::Noop => {}
            }
        }
        Ok(())
    }

    /// Builds the configured logger: the sink itself for one sink, a fanout otherwise.
    pub fn build(&self) -> Result<SharedLogger, LoggerError> {
        self.validate()?;

        let mut loggers = self
            .sinks
            .iter()
            .map(|sink| self.build_sink(sink))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match loggers.len() {
            0 => NoopLogger::shared(),
            1 => loggers.remove(0),
            _ => Arc::new(FanoutLogger::new(&self.name, loggers)),
        })
    }

    fn build_sink(&self, sink: &SinkConfig) -> Result<SharedLogger, LoggerError> {
        let name = self.name.as_str();
        let level = self.level;
        Ok(match sink {
            SinkConfig::Console { target, format } => {
                Arc::new(ConsoleLogger::new(name, level, *format, *target))
            }
            SinkConfig::File {
                path,
                max_size_mb,
                max_age_hours,
            } => Arc::new(FileLogger::with_rotation(
                path,
                name,
                level,
                FileRotation::new(*max_size_mb, *max_age_hours)?,
            )?),
            SinkConfig::Remote(remote) => Arc::new(RemoteLogger::spawn(
                name,
                level,
                remote.to_remote_config(),
            )?),
            SinkConfig::Tracing => Arc::new(TracingLogger::new(name, level)),
            SinkConfig::Memory => Arc::new(MemoryLogger::with_level(name, level)),
            SinkConfig::Noop => NoopLogger::shared(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.name, "app");
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.sinks.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = LoggerConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_parse_full_toml() {
        let config = LoggerConfig::from_toml_str(
            r#"
            name = "billing"
            level = "warn"

            [[sinks]]
            type = "console"
            target = "stderr"
            format = "json"

            [[sinks]]
            type = "file"
            path = "/var/log/billing/billing.json"
            max_size_mb = 50

            [[sinks]]
            type = "remote"
            endpoint = "https://collector.internal:9600/v1/aggregate"
            batch_size = 100
            compression = true
            fallback = "drop"
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "billing");
        assert_eq!(config.level, Level::Warn);
        assert_eq!(
            config.sinks[0],
            SinkConfig::Console {
                target: ConsoleTarget::Stderr,
                format: Format::Json,
            }
        );
        assert_eq!(
            config.sinks[1],
            SinkConfig::File {
                path: PathBuf::from("/var/log/billing/billing.json"),
                max_size_mb: 50,
                max_age_hours: 12,
            }
        );
        let SinkConfig::Remote(remote) = &config.sinks[2] else {
            panic!("Expected remote sink");
        };
        assert_eq!(remote.batch_size, 100);
        assert!(remote.compression);
        assert_eq!(remote.fallback, FallbackPolicy::Drop);
        assert_eq!(remote.queue_capacity, RemoteConfig::default().queue_capacity);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = LoggerConfig::from_toml_str("colour = true");
        assert!(matches!(result, Err(LoggerError::Toml(_))));

        let result = LoggerConfig::from_toml_str("[[sinks]]\ntype = \"carrier-pigeon\"");
        assert!(matches!(result, Err(LoggerError::Toml(_))));
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(LoggerConfig::from_toml_str("level = \"verbose\"").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_sinks() {
        let config = LoggerConfig {
            sinks: vec![SinkConfig::File {
                path: PathBuf::from("/tmp/x.json"),
                max_size_mb: 0,
                max_age_hours: 1,
            }],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LoggerConfig {
            sinks: vec![SinkConfig::Remote(RemoteSinkConfig {
                endpoint: "not-a-url".into(),
                ..Default::default()
            })],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LoggerError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_out_of_range_rotation_is_a_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        let file_sink = |max_size_mb: u64, max_age_hours: i64| LoggerConfig {
            sinks: vec![SinkConfig::File {
                path: path.clone(),
                max_size_mb,
                max_age_hours,
            }],
            ..Default::default()
        };

        for config in [
            file_sink(9_000_000_000_000_000_000, 12),
            file_sink(10, 9_000_000_000_000),
            file_sink(10, -1),
        ] {
            assert!(matches!(config.validate(), Err(LoggerError::Config(_))));
            assert!(matches!(config.build(), Err(LoggerError::Config(_))));
        }

        let toml = format!(
            "[[sinks]]\ntype = \"file\"\npath = {:?}\nmax_age_hours = 9000000000000",
            path.display().to_string()
        );
        assert!(matches!(
            LoggerConfig::from_toml_str(&toml),
            Err(LoggerError::Config(_))
        ));
        assert!(file_sink(u64::MAX / (1024 * 1024), 1).build().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = LoggerConfig::default();
        config
            .apply_env(env(&[
                ("LOG_LEVEL", "debug"),
                ("LOG_FORMAT", "JSON"),
                ("LOG_NAME", "worker"),
            ]))
            .unwrap();

        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.name, "worker");
        assert!(matches!(
            config.sinks[0],
            SinkConfig::Console {
                format: Format::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_env_overrides_invalid() {
        let mut config = LoggerConfig::default();
        assert!(config.apply_env(env(&[("LOG_LEVEL", "loud")])).is_err());
        assert!(config.apply_env(env(&[("LOG_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn test_env_without_variables_is_noop() {
        let mut config = LoggerConfig::default();
        config.apply_env(env(&[])).unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = LoggerConfig {
            name: "svc".into(),
            level: Level::Error,
            sinks: vec![SinkConfig::Tracing, SinkConfig::Noop],
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(LoggerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_remote_sink_config_conversion() {
        let remote = RemoteSinkConfig {
            flush_interval_ms: 250,
            base_delay_ms: 10,
            ..Default::default()
        };
        let converted = remote.to_remote_config();
        assert_eq!(converted.flush_interval, Duration::from_millis(250));
        assert_eq!(converted.retry.base_delay, Duration::from_millis(10));
        assert_eq!(RemoteSinkConfig::from(&converted), remote);
    }

    #[test]
    fn test_build_single_and_fanout() {
        let single = LoggerConfig {
            sinks: vec![SinkConfig::Memory],
            ..Default::default()
        };
        let logger = single.build().unwrap();
        assert_eq!(logger.name(), "app");
        assert!(!logger.enabled(Level::Debug));

        let multi = LoggerConfig {
            level: Level::Debug,
            sinks: vec![SinkConfig::Memory, SinkConfig::Noop],
            ..Default::default()
        };
        let logger = multi.build().unwrap();
        assert!(logger.enabled(Level::Debug));
        logger.debug("reaches the memory sink".into());
        logger.flush();

        let none = LoggerConfig {
            sinks: Vec::new(),
            ..Default::default()
        };
        assert!(!none.build().unwrap().enabled(Level::Error));
    }
}
