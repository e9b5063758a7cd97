//! Routing error types.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors returned by path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No declared pattern matches the path.
    #[error("no route matches `{path}`")]
    NoMatch { path: String },

    /// Redirects kept forwarding past the hop limit.
    #[error("redirect limit of {hops} hops exceeded while resolving `{path}`")]
    RedirectLoop { path: String, hops: usize },
}

/// Errors returned when building a path from a route name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no route is named `{name}`")]
    UnknownName { name: String },

    #[error("route `{name}` requires parameter `{param}`")]
    MissingParam { name: String, param: String },

    /// The value would change the structure of the built path.
    #[error("value `{value}` for parameter `{param}` of route `{name}` is not a single path segment")]
    InvalidParam {
        name: String,
        param: String,
        value: String,
    },
}

/// A route declaration was rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid route declaration: {}", join_errors(.errors))]
pub struct DeclarationError {
    pub errors: Vec<ValidationError>,
}

impl DeclarationError {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for resolution.
pub type RouteResult<T> = Result<T, RouteError>;
