//! Route lookup and path building.
//!
//! # Responsibilities
//! - Resolve a requested path to a compiled route plus captured parameters
//! - Follow redirects up to a fixed hop limit
//! - Fall back to a configured default route on request
//! - Build concrete paths from route names
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order, first match wins
//! - Explicit NoMatch rather than silent default

use tracing::{debug, warn};

use crate::config::schema::{RouteConfig, RouterConfig};
use crate::config::validation;
use crate::observability::metrics;
use crate::routing::error::{BuildError, DeclarationError, RouteError, RouteResult};
use crate::routing::matcher::{self, Params};
use crate::routing::pattern::{PathPattern, Segment};
use crate::routing::table::{HandlerRef, RedirectTarget, RouteDefinition, RouteId, RouteTable, TableMatch};

/// A successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute<'r> {
    /// The route that was resolved.
    pub definition: &'r RouteDefinition,

    /// Outermost parent first, `definition` last.
    pub matched: Vec<&'r RouteDefinition>,

    /// Parameters captured from the path.
    pub params: Params,

    /// Query-string pairs.
    pub query: Params,

    /// Normalized path that was finally matched (after redirects).
    pub path: String,

    /// The requested path, when at least one redirect was followed.
    pub redirected_from: Option<String>,
}

impl<'r> ResolvedRoute<'r> {
    pub fn name(&self) -> Option<&'r str> {
        self.definition.name()
    }

    pub fn handler(&self) -> Option<&'r HandlerRef> {
        self.definition.handler()
    }

    pub fn title(&self) -> Option<&'r str> {
        self.definition.title()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Declarative path router.
///
/// Built once from a declaration and shared by reference; every operation
/// takes `&self`.
#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
    default_route: Option<RouteId>,
    max_redirect_hops: usize,
}

impl Router {
    /// Compile a full declaration, including settings.
    pub fn from_config(config: &RouterConfig) -> Result<Self, DeclarationError> {
        let mut errors = validation::validate_settings(config);

        let table = match RouteTable::compile(&config.routes) {
            Ok(table) => Some(table),
            Err(err) => {
                errors.extend(err.errors);
                None
            }
        };

        let table = match table {
            Some(table) if errors.is_empty() => table,
            _ => return Err(DeclarationError::new(errors)),
        };

        let default_route = config
            .settings
            .default_route
            .as_deref()
            .and_then(|name| table.by_name(name))
            .map(RouteDefinition::id);

        Ok(Self {
            table,
            default_route,
            max_redirect_hops: config.settings.max_redirect_hops,
        })
    }

    /// Compile routes with default settings.
    pub fn from_routes(routes: Vec<RouteConfig>) -> Result<Self, DeclarationError> {
        Self::from_config(&RouterConfig {
            routes,
            ..RouterConfig::default()
        })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Look up a route by name.
    pub fn route(&self, name: &str) -> Option<&RouteDefinition> {
        self.table.by_name(name)
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.table.iter()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn default_route(&self) -> Option<&RouteDefinition> {
        self.default_route.map(|id| &self.table[id])
    }

    pub fn max_redirect_hops(&self) -> usize {
        self.max_redirect_hops
    }

    /// Resolve a path, following redirects.
    pub fn resolve(&self, path: &str) -> RouteResult<ResolvedRoute<'_>> {
        let result = self.resolve_inner(path);
        metrics::record_resolution(outcome(&result));
        result
    }

    /// Resolve a path, falling back to the default route when nothing matches.
    ///
    /// Redirect loops are still reported. Without a default route the
    /// original `NoMatch` is returned.
    pub fn resolve_or_default(&self, path: &str) -> RouteResult<ResolvedRoute<'_>> {
        let (result, outcome) = self.resolve_with_fallback(path);
        metrics::record_resolution(outcome);
        result
    }

    fn resolve_with_fallback(&self, path: &str) -> (RouteResult<ResolvedRoute<'_>>, &'static str) {
        match (self.resolve_inner(path), self.default_route) {
            (Err(RouteError::NoMatch { path: missed }), Some(id)) => {
                (Ok(self.fallback(id, &missed)), "default")
            }
            (result, _) => {
                let outcome = outcome(&result);
                (result, outcome)
            }
        }
    }

    fn fallback(&self, id: RouteId, missed: &str) -> ResolvedRoute<'_> {
        let definition = &self.table[id];
        debug!(path = %missed, route = ?definition.name(), "Falling back to default route");

        let (request_path, query) = matcher::split_request(missed);
        ResolvedRoute {
            definition,
            matched: self.table.chain(id).into_iter().map(|id| &self.table[id]).collect(),
            params: Params::new(),
            query: matcher::parse_query(query),
            path: matcher::join_segments(&matcher::split_segments(request_path)),
            redirected_from: None,
        }
    }

    fn resolve_inner(&self, requested: &str) -> RouteResult<ResolvedRoute<'_>> {
        let mut current = requested.to_string();
        let mut query = matcher::parse_query(matcher::split_request(requested).1);
        let mut hops = 0;

        loop {
            let (path, raw_query) = matcher::split_request(&current);
            if hops > 0 && raw_query.is_some() {
                query = matcher::parse_query(raw_query);
            }
            let segments = matcher::split_segments(path);

            let Some(found) = self.table.find(&segments) else {
                debug!(path = %requested, "No route matched");
                return Err(RouteError::NoMatch {
                    path: requested.to_string(),
                });
            };
            let leaf = &self.table[found.leaf()];

            let Some(target) = leaf.redirect() else {
                debug!(path = %requested, route = ?leaf.name(), params = ?found.params, "Route resolved");
                return Ok(self.resolved(found, query, &segments, requested, hops));
            };

            if hops >= self.max_redirect_hops {
                warn!(path = %requested, hops, "Redirect limit exceeded");
                return Err(RouteError::RedirectLoop {
                    path: requested.to_string(),
                    hops,
                });
            }

            hops += 1;
            let next = substitute_params(target, leaf.full_pattern(), &found.params);
            debug!(from = %path, to = %next, hop = hops, "Following redirect");
            metrics::record_redirect();
            current = next;
        }
    }

    fn resolved(
        &self,
        found: TableMatch,
        query: Params,
        segments: &[&str],
        requested: &str,
        hops: usize,
    ) -> ResolvedRoute<'_> {
        let definition = &self.table[found.leaf()];
        ResolvedRoute {
            definition,
            matched: found.chain.iter().map(|&id| &self.table[id]).collect(),
            params: found.params,
            query,
            path: matcher::join_segments(segments),
            redirected_from: (hops > 0).then(|| requested.to_string()),
        }
    }

    /// Build a concrete path for a named route.
    pub fn build_path(&self, name: &str, params: &Params) -> Result<String, BuildError> {
        let definition = self.route(name).ok_or_else(|| BuildError::UnknownName {
            name: name.to_string(),
        })?;

        let mut path = String::new();
        for segment in definition.full_pattern().segments() {
            match segment {
                Segment::Literal(literal) => {
                    path.push('/');
                    path.push_str(literal);
                }
                Segment::Param(param) => {
                    let value = params
                        .get(param)
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| BuildError::MissingParam {
                            name: name.to_string(),
                            param: param.clone(),
                        })?;
                    if value.contains('/') {
                        return Err(BuildError::InvalidParam {
                            name: name.to_string(),
                            param: param.clone(),
                            value: value.clone(),
                        });
                    }
                    path.push('/');
                    path.push_str(&matcher::encode_segment(value));
                }
                Segment::CatchAll(Some(param)) => {
                    let value = params.get(param).ok_or_else(|| BuildError::MissingParam {
                        name: name.to_string(),
                        param: param.clone(),
                    })?;
                    for part in matcher::split_segments(value) {
                        path.push('/');
                        path.push_str(&matcher::encode_segment(part));
                    }
                }
                Segment::CatchAll(None) => {}
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

fn outcome(result: &RouteResult<ResolvedRoute<'_>>) -> &'static str {
    match result {
        Ok(_) => "matched",
        Err(RouteError::NoMatch { .. }) => "no_match",
        Err(RouteError::RedirectLoop { .. }) => "redirect_loop",
    }
}

/// Fill `:name` and `*name` segments of a redirect target from values
/// captured by `source`.
///
/// A value captured by a catch-all keeps its `/` separators; any other value
/// is written as a single encoded segment.
fn substitute_params(target: &RedirectTarget, source: &PathPattern, params: &Params) -> String {
    let mut out = String::new();

    for segment in target.pattern().segments() {
        let name = match segment {
            Segment::Literal(literal) => {
                out.push('/');
                out.push_str(literal);
                continue;
            }
            Segment::CatchAll(None) => continue,
            Segment::Param(name) | Segment::CatchAll(Some(name)) => name,
        };

        let Some(value) = params.get(name) else {
            out.push('/');
            out.push_str(&segment.to_string());
            continue;
        };
        let spans = source
            .segments()
            .iter()
            .any(|s| matches!(s, Segment::CatchAll(Some(n)) if n == name));

        if spans {
            for part in matcher::split_segments(value) {
                out.push('/');
                out.push_str(&matcher::encode_segment(part));
            }
        } else if !value.is_empty() {
            out.push('/');
            out.push_str(&matcher::encode_segment(value));
        }
    }

    if out.is_empty() {
        out.push('/');
    }
    if let Some(query) = target.query() {
        out.push('?');
        out.push_str(query);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn exam_router() -> Router {
        Router::from_routes(vec![
            RouteConfig::new("/").with_redirect("/home"),
            RouteConfig::new("/home").with_name("Home").with_view("HomeView"),
            RouteConfig::new("/exam/:exam_id")
                .with_name("ExamDetail")
                .with_view("ExamDetailView")
                .with_child(RouteConfig::new("papers").with_name("ExamPapers").with_view("PapersView")),
            RouteConfig::new("/files/*rest").with_name("Files").with_view("FilesView"),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_static() {
        let router = exam_router();
        let resolved = router.resolve("/home").unwrap();
        assert_eq!(resolved.name(), Some("Home"));
        assert!(resolved.params.is_empty());
        assert_eq!(resolved.redirected_from, None);
    }

    #[test]
    fn test_resolve_redirect_single_hop() {
        let router = exam_router();
        let resolved = router.resolve("/").unwrap();
        assert_eq!(resolved.name(), Some("Home"));
        assert_eq!(resolved.path, "/home");
        assert_eq!(resolved.redirected_from.as_deref(), Some("/"));
    }

    #[test]
    fn test_redirect_keeps_query() {
        let router = exam_router();
        let resolved = router.resolve("/?tab=2").unwrap();
        assert_eq!(resolved.query.get("tab").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_redirect_loop() {
        let router = Router::from_routes(vec![
            RouteConfig::new("/").with_redirect("/home"),
            RouteConfig::new("/home").with_redirect("/home"),
        ])
        .unwrap();

        assert_eq!(
            router.resolve("/"),
            Err(RouteError::RedirectLoop {
                path: "/".into(),
                hops: 10,
            })
        );
    }

    #[test]
    fn test_redirect_substitutes_params() {
        let router = Router::from_routes(vec![
            RouteConfig::new("/exams/:exam_id").with_redirect("/exam/:exam_id"),
            RouteConfig::new("/exam/:exam_id").with_name("ExamDetail").with_view("ExamDetailView"),
        ])
        .unwrap();

        let resolved = router.resolve("/exams/9").unwrap();
        assert_eq!(resolved.name(), Some("ExamDetail"));
        assert_eq!(resolved.param("exam_id"), Some("9"));
        assert_eq!(resolved.path, "/exam/9");
    }

    #[test]
    fn test_matched_chain() {
        let router = exam_router();
        let resolved = router.resolve("/exam/42/papers").unwrap();
        let names: Vec<_> = resolved.matched.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec![Some("ExamDetail"), Some("ExamPapers")]);
    }

    #[test]
    fn test_build_path() {
        let router = exam_router();
        assert_eq!(router.build_path("Home", &Params::new()).unwrap(), "/home");
        assert_eq!(
            router
                .build_path("ExamPapers", &params(&[("exam_id", "42")]))
                .unwrap(),
            "/exam/42/papers"
        );
        assert_eq!(
            router
                .build_path("Files", &params(&[("rest", "a/b.txt")]))
                .unwrap(),
            "/files/a/b.txt"
        );
    }

    #[test]
    fn test_build_path_errors() {
        let router = exam_router();
        assert_eq!(
            router.build_path("Nope", &Params::new()),
            Err(BuildError::UnknownName { name: "Nope".into() })
        );
        assert_eq!(
            router.build_path("ExamDetail", &params(&[("exam_id", "")])),
            Err(BuildError::MissingParam {
                name: "ExamDetail".into(),
                param: "exam_id".into(),
            })
        );
        assert!(matches!(
            router.build_path("ExamDetail", &params(&[("exam_id", "4/2")])),
            Err(BuildError::InvalidParam { .. })
        ));
    }

    #[test]
    fn test_resolve_or_default_without_default() {
        let router = exam_router();
        assert_eq!(
            router.resolve_or_default("/missing").unwrap_err(),
            RouteError::NoMatch {
                path: "/missing".into()
            }
        );
    }

    #[test]
    fn test_substitute_params() {
        let target = |raw: &str| RedirectTarget::parse(raw).unwrap();
        let source = PathPattern::parse("/old/:id/*rest").unwrap();

        let captured = params(&[("id", "3"), ("rest", "")]);
        assert_eq!(substitute_params(&target("/exam/:id?x=1"), &source, &captured), "/exam/3?x=1");
        assert_eq!(substitute_params(&target("/files/*rest"), &source, &captured), "/files");
        assert_eq!(substitute_params(&target("/"), &source, &captured), "/");

        let captured = params(&[("id", "a b"), ("rest", "x y/z")]);
        assert_eq!(substitute_params(&target("/exam/:id"), &source, &captured), "/exam/a%20b");
        assert_eq!(substitute_params(&target("/files/*rest"), &source, &captured), "/files/x%20y/z");
    }

    #[test]
    fn test_fallback_counted_once() {
        let mut config = RouterConfig::default();
        config.settings.default_route = Some("Home".into());
        config.routes = vec![RouteConfig::new("/home").with_name("Home").with_view("HomeView")];
        let router = Router::from_config(&config).unwrap();

        let (result, outcome) = router.resolve_with_fallback("/missing");
        assert_eq!(result.unwrap().name(), Some("Home"));
        assert_eq!(outcome, "default");

        let (result, outcome) = router.resolve_with_fallback("/home");
        assert!(result.is_ok());
        assert_eq!(outcome, "matched");

        let (_, outcome) = exam_router().resolve_with_fallback("/missing");
        assert_eq!(outcome, "no_match");
    }

    #[test]
    fn test_params_are_decoded_and_encoded() {
        let router = exam_router();
        let resolved = router.resolve("/exam/a%20b").unwrap();
        assert_eq!(resolved.param("exam_id"), Some("a b"));

        let path = router.build_path("ExamDetail", &params(&[("exam_id", "a b")])).unwrap();
        assert_eq!(path, "/exam/a%20b");

        let path = router.build_path("ExamDetail", &params(&[("exam_id", "x?y#z")])).unwrap();
        assert_eq!(router.resolve(&path).unwrap().param("exam_id"), Some("x?y#z"));
    }

    #[test]
    fn test_redirect_keeps_encoding() {
        let router = Router::from_routes(vec![
            RouteConfig::new("/exams/:exam_id").with_redirect("/exam/:exam_id"),
            RouteConfig::new("/exam/:exam_id").with_name("ExamDetail").with_view("ExamDetailView"),
        ])
        .unwrap();

        let resolved = router.resolve("/exams/50%25").unwrap();
        assert_eq!(resolved.param("exam_id"), Some("50%"));
        assert_eq!(resolved.path, "/exam/50%25");
    }

    #[test]
    fn test_router_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router>();
    }
}
