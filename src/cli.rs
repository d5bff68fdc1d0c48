//! Command-line front end: emits one message (or stdin lines) through a configured logger.

use crate::config::{LoggerConfig, SinkConfig};
use crate::diagnostics;
use crate::domain::{Context, Field, Level, Message, Value};
use crate::logger::{Logger, SharedLogger};
use crate::sink::Format;
use anyhow::Context as _;
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Emit log entries through a configured rask-logger pipeline", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "LOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logger name, overrides the configuration
    #[arg(long)]
    pub name: Option<String>,

    /// Minimum level, overrides the configuration
    #[arg(long)]
    pub min_level: Option<Level>,

    /// Console output format, overrides the configuration
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// W3C traceparent header to correlate the entries with
    #[arg(long)]
    pub traceparent: Option<String>,

    /// Request id attached to every entry
    #[arg(long)]
    pub request_id: Option<String>,

    /// Severity of the emitted entries
    pub level: Level,

    /// Message text, or `-` to emit every line read from stdin
    pub message: String,

    /// Structured fields as KEY=VALUE
    pub fields: Vec<String>,
}

impl Cli {
    pub fn load_config(&self) -> anyhow::Result<LoggerConfig> {
        let mut config = match &self.config {
            Some(path) => LoggerConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => LoggerConfig::default(),
        };
        config
            .apply_process_env()
            .context("Invalid logging environment")?;

        if let Some(name) = &self.name {
            config.name.clone_from(name);
        }
        if let Some(level) = self.min_level {
            config.level = level;
        }
        if let Some(format) = self.format {
            for sink in &mut config.sinks {
                if let SinkConfig::Console { format: current, .. } = sink {
                    *current = format;
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn context(&self) -> anyhow::Result<Context> {
        let mut ctx = match &self.traceparent {
            Some(header) => Context::from_traceparent(header)?,
            None => Context::new(),
        };
        if let Some(request_id) = &self.request_id {
            ctx = ctx.with_request_id(request_id.as_str());
        }
        Ok(ctx)
    }
}

/// Parses `KEY=VALUE` arguments. Anything without a key becomes a field whose value is
/// [`Value::Missing`].
pub fn parse_fields(args: &[String]) -> Vec<Field> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, value)) if !key.is_empty() => Field::new(key, parse_value(value)),
            _ => Field::new(arg.as_str(), Value::Missing),
        })
        .collect()
}

fn parse_value(raw: &str) -> Value {
    if let Ok(v) = raw.parse::<i64>() {
        return Value::I64(v);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Value::U64(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => return Value::F64(v),
        _ => {}
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::Str(raw.to_string()),
    }
}

fn emit_all(
    logger: &SharedLogger,
    cli: &Cli,
    ctx: &Context,
    fields: &[Field],
) -> anyhow::Result<usize> {
    let ctx = (!ctx.is_empty()).then_some(ctx);

    if cli.message != "-" {
        logger.emit(ctx, cli.level, Message::from(&cli.message), fields);
        return Ok(1);
    }

    let mut emitted = 0;
    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.is_empty() {
            continue;
        }
        logger.emit(ctx, cli.level, Message::from(&line), fields);
        emitted += 1;
    }
    Ok(emitted)
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    if let Err(e) = diagnostics::init(Format::Text) {
        eprintln!("{e}");
    }

    let config = cli.load_config()?;
    let ctx = cli.context()?;
    let fields = parse_fields(&cli.fields);
    let logger = config.build().context("Failed to build logger")?;

    let emitted = emit_all(&logger, &cli, &ctx, &fields)?;
    logger.flush();
    tracing::debug!(emitted, logger = %config.name, "entries emitted");
    Ok(())
}
