//! Declaration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (redirect targets and the default route exist)
//! - Detect duplicate names, names on non-view routes and parameter collisions
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before a declaration is accepted into the system

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::pattern::PatternError;
use crate::routing::Router;

/// A single semantic problem in a route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route `{path}`: {source}")]
    Pattern { path: String, source: PatternError },

    #[error("route name `{name}` is declared more than once")]
    DuplicateName { name: String },

    /// Only view routes can be named, since building a path for a redirect
    /// or a group would resolve somewhere else.
    #[error("route `{path}` is named `{name}` but activates no view")]
    NameWithoutView { name: String, path: String },

    #[error("route `{path}` declares both a view and a redirect")]
    ConflictingTarget { path: String },

    #[error("route `{path}` declares neither a view, a redirect nor children")]
    MissingTarget { path: String },

    #[error("redirect route `{path}` cannot have children")]
    RedirectWithChildren { path: String },

    #[error("nested route `{path}` must be relative to its parent")]
    AbsoluteChildPath { path: String },

    #[error("route `{path}` redirects to `{target}`, which matches no declared route")]
    RedirectTargetNotFound { path: String, target: String },

    #[error("route `{path}` redirects to `{target}`, but `{param}` is not captured by `{path}`")]
    RedirectParamNotCaptured {
        path: String,
        target: String,
        param: String,
    },

    #[error("default route `{name}` is not declared")]
    UnknownDefaultRoute { name: String },

    #[error("default route `{name}` must activate a view")]
    InvalidDefaultRoute { name: String },

    #[error("max_redirect_hops must be at least 1")]
    ZeroRedirectHops,
}

/// Validate a declaration without keeping the compiled router.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    Router::from_config(config)
        .map(|_| ())
        .map_err(|err| err.errors)
}

/// Checks that do not need a compiled table.
pub(crate) fn validate_settings(config: &RouterConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.settings.max_redirect_hops == 0 {
        errors.push(ValidationError::ZeroRedirectHops);
    }

    if let Some(name) = &config.settings.default_route {
        let mut declared = None;
        for route in &config.routes {
            route.walk(&mut |r| {
                if r.name.as_deref() == Some(name.as_str()) && declared.is_none() {
                    declared = Some(r.view.is_some());
                }
            });
        }
        match declared {
            None => errors.push(ValidationError::UnknownDefaultRoute { name: name.clone() }),
            Some(false) => errors.push(ValidationError::InvalidDefaultRoute { name: name.clone() }),
            Some(true) => {}
        }
    }

    errors
}
