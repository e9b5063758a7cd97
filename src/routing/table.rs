//! Compiled route table.
//!
//! # Responsibilities
//! - Compile route declarations into an immutable arena
//! - Index named routes for path building
//! - Walk the table in declaration order to find the first structural match
//!
//! # Design Decisions
//! - Definitions live in one `Vec`, nesting is expressed with `RouteId` indices
//! - Each definition keeps its own pattern and its full (parent + own) pattern
//! - Compilation reports every problem found, not just the first

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use crate::config::schema::{Meta, RouteConfig};
use crate::config::validation::ValidationError;
use crate::routing::error::DeclarationError;
use crate::routing::matcher::{self, Params, Shape};
use crate::routing::pattern::{PathPattern, PatternError, Segment};

/// Index of a definition inside its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(usize);

impl RouteId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Opaque reference to the view a route activates.
///
/// The router never interprets it; the navigation layer maps it to a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef(String);

impl HandlerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a redirect forwards to, parsed at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectTarget {
    raw: String,
    pattern: PathPattern,
    query: Option<String>,
}

impl RedirectTarget {
    /// Parse `path?query`. Placeholders in the path use the pattern syntax.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let (path, query) = matcher::split_request(raw);
        Ok(Self {
            raw: raw.to_string(),
            pattern: PathPattern::parse(path)?,
            query: query.map(str::to_string),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// What happens when a definition is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteTarget {
    /// Activate a view.
    View(HandlerRef),
    /// Forward resolution to another path.
    Redirect(RedirectTarget),
    /// Parent that only groups children; never resolved on its own.
    Group,
}

/// A compiled route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDefinition {
    id: RouteId,
    pattern: PathPattern,
    full_pattern: PathPattern,
    name: Option<String>,
    target: RouteTarget,
    meta: Meta,
    parent: Option<RouteId>,
    children: Vec<RouteId>,
}

impl RouteDefinition {
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// Pattern as declared, relative to the parent for nested routes.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Pattern from the root, including every parent.
    pub fn full_pattern(&self) -> &PathPattern {
        &self.full_pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn handler(&self) -> Option<&HandlerRef> {
        match &self.target {
            RouteTarget::View(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn redirect(&self) -> Option<&RedirectTarget> {
        match &self.target {
            RouteTarget::Redirect(target) => Some(target),
            _ => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.target, RouteTarget::Redirect(_))
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// `meta.title`, when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.meta.get("title").and_then(|v| v.as_str())
    }

    pub fn parent(&self) -> Option<RouteId> {
        self.parent
    }

    pub fn children(&self) -> &[RouteId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Result of a structural walk. `chain` runs from the outermost parent to the leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMatch {
    pub chain: Vec<RouteId>,
    pub params: Params,
}

impl TableMatch {
    pub fn leaf(&self) -> RouteId {
        // chain is never empty: every match contains at least the matched route
        self.chain[self.chain.len() - 1]
    }
}

/// Immutable, ordered set of compiled routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    defs: Vec<RouteDefinition>,
    roots: Vec<RouteId>,
    by_name: HashMap<String, RouteId>,
}

impl RouteTable {
    /// Compile declarations in order.
    pub fn compile(routes: &[RouteConfig]) -> Result<Self, DeclarationError> {
        let mut builder = TableBuilder::default();
        let roots = builder.add_all(routes, None);

        let table = RouteTable {
            defs: builder.defs,
            roots,
            by_name: builder.by_name,
        };

        let mut errors = builder.errors;
        errors.extend(table.check_redirects());

        if !errors.is_empty() {
            return Err(DeclarationError::new(errors));
        }

        tracing::info!(
            routes = table.defs.len(),
            named = table.by_name.len(),
            "Route table compiled"
        );
        Ok(table)
    }

    pub fn get(&self, id: RouteId) -> Option<&RouteDefinition> {
        self.defs.get(id.0)
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteDefinition> {
        self.by_name.get(name).map(|id| &self.defs[id.0])
    }

    /// Top-level routes in declaration order.
    pub fn roots(&self) -> &[RouteId] {
        &self.roots
    }

    /// All definitions, parents before their children.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Ids from the outermost parent down to `id`.
    pub fn chain(&self, id: RouteId) -> Vec<RouteId> {
        let mut chain = vec![id];
        let mut current = self.defs[id.0].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.defs[parent.0].parent;
        }
        chain.reverse();
        chain
    }

    /// First structural match for `segments`, without following redirects.
    pub fn find(&self, segments: &[&str]) -> Option<TableMatch> {
        self.walk(&self.roots, segments, &Params::new())
    }

    fn walk(&self, ids: &[RouteId], segments: &[&str], params: &Params) -> Option<TableMatch> {
        for &id in ids {
            let def = &self.defs[id.0];
            let mut captured = params.clone();
            let Some(consumed) = matcher::match_prefix(&def.pattern, segments, &mut captured) else {
                continue;
            };
            let rest = &segments[consumed..];

            if def.has_children() {
                if let Some(mut found) = self.walk(&def.children, rest, &captured) {
                    found.chain.insert(0, id);
                    return Some(found);
                }
            }

            if rest.is_empty() && def.target != RouteTarget::Group {
                return Some(TableMatch {
                    chain: vec![id],
                    params: captured,
                });
            }
        }
        None
    }

    /// Whether every expansion of `shapes` resolves to some route.
    fn accepts(&self, ids: &[RouteId], shapes: &[Shape<'_>]) -> bool {
        ids.iter().any(|&id| {
            let def = &self.defs[id.0];
            let Some(consumed) = matcher::match_shape_prefix(&def.pattern, shapes) else {
                return false;
            };
            let rest = &shapes[consumed..];

            (def.has_children() && self.accepts(&def.children, rest))
                || (rest.is_empty() && def.target != RouteTarget::Group)
        })
    }

    fn check_redirects(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for def in &self.defs {
            let Some(target) = def.redirect() else {
                continue;
            };
            let path = def.full_pattern.to_string();
            let mut shapes = Vec::new();

            for segment in target.pattern().segments() {
                let shape = match segment {
                    Segment::Literal(literal) => Shape::Literal(literal.as_str()),
                    Segment::CatchAll(None) => continue,
                    Segment::Param(name) | Segment::CatchAll(Some(name)) => {
                        match captured_shape(&def.full_pattern, name) {
                            Some(shape) => shape,
                            None => {
                                errors.push(ValidationError::RedirectParamNotCaptured {
                                    path: path.clone(),
                                    target: target.to_string(),
                                    param: name.clone(),
                                });
                                Shape::One
                            }
                        }
                    }
                };
                shapes.push(shape);
            }

            if !self.accepts(&self.roots, &shapes) {
                errors.push(ValidationError::RedirectTargetNotFound {
                    path,
                    target: target.to_string(),
                });
            }
        }

        errors
    }
}

/// How a value captured by `source` expands when written into a target.
fn captured_shape(source: &PathPattern, name: &str) -> Option<Shape<'static>> {
    source.segments().iter().find_map(|segment| match segment {
        Segment::Param(param) if param == name => Some(Shape::One),
        Segment::CatchAll(Some(param)) if param == name => Some(Shape::Many),
        _ => None,
    })
}

impl Index<RouteId> for RouteTable {
    type Output = RouteDefinition;

    fn index(&self, id: RouteId) -> &Self::Output {
        &self.defs[id.0]
    }
}

#[derive(Default)]
struct TableBuilder {
    defs: Vec<RouteDefinition>,
    by_name: HashMap<String, RouteId>,
    errors: Vec<ValidationError>,
}

impl TableBuilder {
    fn add_all(&mut self, routes: &[RouteConfig], parent: Option<RouteId>) -> Vec<RouteId> {
        routes
            .iter()
            .filter_map(|route| self.add(route, parent))
            .collect()
    }

    fn add(&mut self, route: &RouteConfig, parent: Option<RouteId>) -> Option<RouteId> {
        if parent.is_some() && route.path.starts_with('/') {
            self.errors.push(ValidationError::AbsoluteChildPath {
                path: route.path.clone(),
            });
            return None;
        }

        let pattern = match PathPattern::parse(&route.path) {
            Ok(pattern) => pattern,
            Err(source) => {
                self.errors.push(ValidationError::Pattern {
                    path: route.path.clone(),
                    source,
                });
                return None;
            }
        };

        let parent_pattern = match parent {
            Some(id) => self.defs[id.0].full_pattern.clone(),
            None => PathPattern::default(),
        };
        let full_pattern = match parent_pattern.join(&pattern) {
            Ok(full) => full,
            Err(source) => {
                self.errors.push(ValidationError::Pattern {
                    path: format!("{}/{}", parent_pattern, route.path.trim_start_matches('/')),
                    source,
                });
                return None;
            }
        };
        let display_path = full_pattern.to_string();

        let target = match (&route.view, &route.redirect) {
            (Some(view), None) => RouteTarget::View(HandlerRef::new(view.clone())),
            (None, Some(redirect)) => {
                if !route.children.is_empty() {
                    self.errors.push(ValidationError::RedirectWithChildren {
                        path: display_path.clone(),
                    });
                }
                match RedirectTarget::parse(redirect) {
                    Ok(target) => RouteTarget::Redirect(target),
                    Err(source) => {
                        self.errors.push(ValidationError::Pattern {
                            path: redirect.clone(),
                            source,
                        });
                        RouteTarget::Group
                    }
                }
            }
            (Some(_), Some(_)) => {
                self.errors.push(ValidationError::ConflictingTarget {
                    path: display_path.clone(),
                });
                RouteTarget::Group
            }
            (None, None) => {
                if route.children.is_empty() {
                    self.errors.push(ValidationError::MissingTarget {
                        path: display_path.clone(),
                    });
                }
                RouteTarget::Group
            }
        };

        let id = RouteId(self.defs.len());
        if let Some(name) = &route.name {
            if self.by_name.insert(name.clone(), id).is_some() {
                self.errors.push(ValidationError::DuplicateName { name: name.clone() });
            }
            // a built path must resolve back to the route it was built from
            if route.view.is_none() {
                self.errors.push(ValidationError::NameWithoutView {
                    name: name.clone(),
                    path: display_path.clone(),
                });
            }
        }

        self.defs.push(RouteDefinition {
            id,
            pattern,
            full_pattern,
            name: route.name.clone(),
            target,
            meta: route.meta.clone(),
            parent,
            children: Vec::new(),
        });

        let children = self.add_all(&route.children, Some(id));
        self.defs[id.0].children = children;

        Some(id)
    }
}
