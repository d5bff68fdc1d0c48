//! Self-diagnostics of the crate, emitted through `tracing`.

use crate::domain::LoggerError;
use crate::sink::Format;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a global `tracing` subscriber for the crate's own diagnostics.
///
/// Honors `RUST_LOG`, defaulting to `warn`. Diagnostics go to stderr so they never mix
/// with log output written to stdout.
pub fn init(format: Format) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = match format {
        Format::Json => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init(),
        Format::Text => tracing_subscriber::registry()
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| LoggerError::Config(format!("Failed to install diagnostics subscriber: {e}")))
}
