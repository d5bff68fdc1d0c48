#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Durations and counters stay far below u64::MAX
    clippy::cast_precision_loss,      // Acceptable for stats and display
    clippy::missing_errors_doc,       // Constructors document their failure modes in LoggerError
    clippy::module_name_repetitions,  // e.g. LoggerConfig in config module
    clippy::must_use_candidate,       // Builder-style methods return Self
    clippy::doc_markdown              // Level names and header names read fine unquoted
)]

//! A pluggable logging facade.
//!
//! Application code depends on the [`Logger`] trait and never on a concrete backend.
//! Backends ([`ConsoleLogger`], [`FileLogger`], [`RemoteLogger`], [`TracingLogger`],
//! [`MemoryLogger`], [`NoopLogger`], [`FanoutLogger`]) are swapped through configuration.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod global;
pub mod logger;
mod macros;
pub mod sink;
pub mod test_support;

pub use config::{LoggerConfig, RemoteSinkConfig, SinkConfig};
pub use domain::{
    Context, Field, Level, LogEntry, LoggerError, Message, Record, Value, fields_from_flat,
    render_template,
};
pub use global::{global, install};
pub use logger::{Logger, SharedLogger};
pub use sink::{
    ConsoleLogger, ConsoleTarget, FallbackPolicy, FanoutLogger, FileLogger, FileRotation, Format,
    MemoryLogger, NoopLogger, RemoteConfig, RemoteLogger, RetryPolicy, SinkStatsSnapshot,
    TracingLogger,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
