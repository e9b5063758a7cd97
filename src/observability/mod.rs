//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Table compilation and resolution produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (resolution and redirect counters)
//!
//! Consumers:
//!     → stderr through the subscriber installed by the binary
//!     → whatever `metrics` recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing subscribers and recorders is
//!   left to the binary or the embedding application
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
