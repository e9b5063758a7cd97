//! Declarative path router.
//!
//! Resolves URL paths against an ordered, immutable table of route
//! declarations and builds paths back from route names.
//!
//! ```
//! use path_router::{Params, RouteConfig, Router};
//!
//! let router = Router::from_routes(vec![
//!     RouteConfig::new("/").with_redirect("/home"),
//!     RouteConfig::new("/home").with_name("Home").with_view("HomeView"),
//!     RouteConfig::new("/exam/:exam_id").with_name("ExamDetail").with_view("ExamDetailView"),
//! ])?;
//!
//! let resolved = router.resolve("/exam/42")?;
//! assert_eq!(resolved.name(), Some("ExamDetail"));
//! assert_eq!(resolved.param("exam_id"), Some("42"));
//!
//! let params = Params::from([("exam_id".to_string(), "7".to_string())]);
//! assert_eq!(router.build_path("ExamDetail", &params)?, "/exam/7");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod observability;
pub mod routing;

pub use config::schema::{RouteConfig, RouterConfig};
pub use routing::{
    BuildError, DeclarationError, HandlerRef, Params, ResolvedRoute, RouteDefinition, RouteError,
    RouteTarget, Router,
};
