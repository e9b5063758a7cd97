//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Requested path ("/exam/42/papers?tab=1")
//!     → matcher.rs (strip query, split segments)
//!     → table.rs (walk routes in declaration order, descend into children)
//!     → router.rs (follow redirects, apply hop limit)
//!     → Return: ResolvedRoute or RouteError
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → pattern.rs (parse segments)
//!     → table.rs (arena of definitions, name index)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod error;
pub mod matcher;
pub mod pattern;
pub mod router;
pub mod table;

pub use error::{BuildError, DeclarationError, RouteError, RouteResult};
pub use matcher::Params;
pub use pattern::{PathPattern, PatternError, Segment};
pub use router::{ResolvedRoute, Router};
pub use table::{HandlerRef, RedirectTarget, RouteDefinition, RouteId, RouteTable, RouteTarget};
