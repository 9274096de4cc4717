//! Tracing subscriber setup shared by the CLI and the daemon.

use crate::config::LogFormat;
use std::sync::Once;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGING_INIT: Once = Once::new();

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` and the
/// configured `level` applies. Logs go to stderr so command output on
/// stdout stays machine-readable. Later calls are no-ops.
pub fn init_logging(level: &str, format: LogFormat, verbose: bool) {
    LOGGING_INIT.call_once(|| {
        let default_level = if verbose { "debug" } else { level };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let registry = tracing_subscriber::registry().with(filter);
        match format {
            LogFormat::Text => registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .try_init()
                .ok(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_current_span(true),
                )
                .try_init()
                .ok(),
        };
    });
}
