//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for the binary
//! - Configure log level from `RUST_LOG` or the declaration file
//!
//! # Design Decisions
//! - `RUST_LOG` takes precedence over the configured level
//! - Compact human-readable output on stderr; stdout is reserved for results

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a plain level such as `info`.
pub fn default_directive(level: &str) -> String {
    format!("path_router={}", level)
}

/// Install the global subscriber.
pub fn init_logging(level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(level))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
}
