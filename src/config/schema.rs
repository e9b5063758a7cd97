//! Declaration schema definitions.
//!
//! This module defines the complete shape of a route declaration file.
//! All types derive Serde traits so the same document loads from TOML or JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form route metadata (`meta = { title = "..." }`).
pub type Meta = BTreeMap<String, serde_json::Value>;

/// Default number of redirects followed before resolution gives up.
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 10;

/// Root of a route declaration document.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Resolution settings (hop limit, fallback route).
    pub settings: RouterSettings,

    /// Logging settings for the command-line front end.
    pub observability: ObservabilityConfig,

    /// Ordered route declarations. Order decides precedence.
    pub routes: Vec<RouteConfig>,
}

/// Router-wide resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RouterSettings {
    /// Maximum redirects followed for one resolution.
    pub max_redirect_hops: usize,

    /// Name of the route used by `resolve_or_default` when nothing matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_route: Option<String>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
            default_route: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// A single route declaration.
///
/// `path` uses `:name` for single-segment parameters and `*` / `*name` for a
/// trailing catch-all. Nested `children` paths are relative to the parent.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub path: String,

    /// Unique route name, used for path building.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Opaque identifier of the view to activate.
    #[serde(default, alias = "component", skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    /// Path this entry forwards to instead of activating a view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: RouteConfig) -> Self {
        self.children.push(child);
        self
    }

    /// Visits this declaration and every nested child, depth first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a RouteConfig)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.settings.max_redirect_hops, 10);
        assert!(config.settings.default_route.is_none());
        assert_eq!(config.observability.log_level, "info");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_parse_nested_toml() {
        let config: RouterConfig = toml::from_str(
            r#"
            [settings]
            default_route = "Home"

            [[routes]]
            path = "/exam/:exam_id"
            name = "ExamDetail"
            component = "ExamDetailView"
            meta = { title = "考试详情" }

              [[routes.children]]
              path = "papers"
              view = "PapersView"
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.default_route.as_deref(), Some("Home"));
        assert_eq!(config.settings.max_redirect_hops, 10);
        let route = &config.routes[0];
        assert_eq!(route.view.as_deref(), Some("ExamDetailView"));
        assert_eq!(route.meta["title"], serde_json::json!("考试详情"));
        assert_eq!(route.children[0].path, "papers");
    }

    #[test]
    fn test_unknown_route_field_rejected() {
        let result: Result<RouterConfig, _> = toml::from_str(
            r#"
            [[routes]]
            path = "/home"
            veiw = "Home"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_walk_visits_children() {
        let route = RouteConfig::new("/a")
            .with_child(RouteConfig::new("b").with_child(RouteConfig::new("c")))
            .with_child(RouteConfig::new("d"));

        let mut seen = Vec::new();
        route.walk(&mut |r| seen.push(r.path.as_str()));
        assert_eq!(seen, vec!["/a", "b", "c", "d"]);
    }
}
