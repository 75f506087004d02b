use std::io;

use tracing_subscriber::{self, fmt, prelude::*};

/// Initialize the stderr logger.
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
pub fn init_logger(no_color: bool, log_level: Option<&str>) -> io::Result<()> {
    // Configure the stderr log level based on whether --log-level was provided
    let stderr_filter = match log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => {
            // Fall back to RUST_LOG or default to "info". This provides
            // cleaner logs by default while still allowing verbose
            // debugging via RUST_LOG.
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        }
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    let result = tracing_subscriber::registry().with(stderr_layer).try_init();

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            // Ignore errors due to the subscriber or logger already being set
            if e.to_string().contains("already been set") || e.to_string().contains("SetLoggerError") {
                Ok(())
            } else {
                Err(io::Error::new(io::ErrorKind::Other, e))
            }
        }
    }
}
