//! Route declaration subsystem.
//!
//! # Data Flow
//! ```text
//! declaration file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → Router::from_config at startup
//!
//! While editing (`path-router watch`):
//!     watcher.rs detects change
//!     → loader.rs loads new declaration
//!     → validation.rs validates
//!     → a fresh Router is built and reported
//! ```
//!
//! # Design Decisions
//! - Declarations are immutable once loaded; changes require a full reload
//! - All settings have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::RouterConfig;
pub use schema::RouterSettings;
pub use validation::ValidationError;
