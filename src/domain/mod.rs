//! Domain layer for rask-logger.
//!
//! Contains the types every logger implementation shares:
//! - `Level`: severity (Debug < Info < Warn < Error)
//! - `Message` / `Field` / `Value`: what a log call carries
//! - `Context`: propagation context with correlation identifiers
//! - `Record` / `LogEntry`: borrowed and owned forms of one log call
//! - `LoggerError`: construction/configuration error type

pub mod context;
pub mod entry;
pub mod error;
pub mod level;
pub mod message;
pub mod value;

pub use context::Context;
pub use entry::{LogEntry, Record};
pub use error::LoggerError;
pub use level::Level;
pub use message::{Message, render_template};
pub use value::{Field, Value, fields_from_flat};
