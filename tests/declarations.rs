//! Loading, validating and watching declaration files.

use std::time::Duration;

use path_router::config::loader::{load_config, ConfigError};
use path_router::config::validation::{validate_config, ValidationError};
use path_router::config::watcher::ConfigWatcher;
use path_router::{RouteConfig, Router, RouterConfig};

mod common;

#[test]
fn test_load_legacy_sample() {
    let config = load_config(&common::sample("legacy.toml")).unwrap();
    let router = Router::from_config(&config).unwrap();

    assert_eq!(router.len(), 4);
    let resolved = router.resolve("/").unwrap();
    assert_eq!(resolved.handler().map(|h| h.as_str()), Some("ExamListView"));
    assert_eq!(resolved.name(), None);

    let resolved = router.resolve("/exam/5").unwrap();
    assert_eq!(resolved.name(), Some("ExamDetail"));
    assert_eq!(resolved.param("exam_id"), Some("5"));
}

#[test]
fn test_load_console_sample() {
    let config = load_config(&common::sample("console.toml")).unwrap();
    let router = Router::from_config(&config).unwrap();

    let resolved = router.resolve("/exam/42/scores").unwrap();
    assert_eq!(resolved.name(), Some("ScoreView"));
    assert_eq!(resolved.title(), Some("成绩管理"));

    let path = router
        .build_path("ImageView", &common::params(&[("exam_id", "42")]))
        .unwrap();
    assert_eq!(path, "/exam/42/images");
    assert!(router.resolve("/login").is_err());
}

#[test]
fn test_load_json_declaration() {
    let path = common::write_temp(
        "routes.json",
        r#"{
            "settings": { "default_route": "Home" },
            "routes": [
                { "path": "/", "redirect": "/home" },
                { "path": "/home", "name": "Home", "view": "HomeView", "meta": { "title": "考试管理", "order": 1 } }
            ]
        }"#,
    );

    let config = load_config(&path).unwrap();
    let router = Router::from_config(&config).unwrap();
    let resolved = router.resolve_or_default("/anything").unwrap();
    assert_eq!(resolved.name(), Some("Home"));
    assert_eq!(resolved.definition.meta()["order"], serde_json::json!(1));
}

#[test]
fn test_duplicate_names_rejected() {
    let mut config = RouterConfig::default();
    config.routes = vec![
        RouteConfig::new("/home").with_name("Home").with_view("HomeView"),
        RouteConfig::new("/start").with_name("Home").with_view("StartView"),
    ];

    let err = Router::from_config(&config).unwrap_err();
    assert_eq!(
        err.errors,
        vec![ValidationError::DuplicateName {
            name: "Home".into()
        }]
    );
}

#[test]
fn test_file_validation_reports_every_error() {
    let path = common::write_temp(
        "invalid.toml",
        r#"
        [settings]
        default_route = "Missing"

        [[routes]]
        path = "/"
        redirect = "/nowhere"

        [[routes]]
        path = "/exam/:id/:id"
        view = "ExamView"

        [[routes]]
        path = "/exam/:exam_id"
        view = "ExamView"

          [[routes.children]]
          path = "/papers"
          view = "PapersView"
        "#,
    );

    match load_config(&path) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 4, "{:?}", errors);
            assert!(errors.contains(&ValidationError::UnknownDefaultRoute {
                name: "Missing".into()
            }));
            assert!(errors.contains(&ValidationError::AbsoluteChildPath {
                path: "/papers".into()
            }));
            assert!(errors.contains(&ValidationError::RedirectTargetNotFound {
                path: "/".into(),
                target: "/nowhere".into(),
            }));
            assert!(errors
                .iter()
                .any(|e| matches!(e, ValidationError::Pattern { path, .. } if path == "/exam/:id/:id")));
        }
        other => panic!("expected validation errors, got {:?}", other),
    }
}

#[test]
fn test_validate_config_accepts_samples() {
    for name in ["legacy.toml", "console.toml"] {
        let content = std::fs::read_to_string(common::sample(name)).unwrap();
        let config: RouterConfig = toml::from_str(&content).unwrap();
        assert_eq!(validate_config(&config), Ok(()), "{}", name);
    }
}

#[tokio::test]
async fn test_watcher_forwards_valid_reload() {
    let path = common::write_temp(
        "watched.toml",
        "[[routes]]\npath = \"/home\"\nview = \"HomeView\"\n",
    );

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _guard = watcher.run().unwrap();

    std::fs::write(
        &path,
        "[[routes]]\npath = \"/home\"\nview = \"HomeView\"\n\n[[routes]]\npath = \"/login\"\nview = \"LoginView\"\n",
    )
    .unwrap();

    // editors may truncate before writing, so skip intermediate snapshots
    let reloaded = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match updates.recv().await {
                Some(config) if config.routes.len() == 2 => return Some(config),
                Some(_) => continue,
                None => return None,
            }
        }
    })
    .await
    .expect("watcher did not report the change in time")
    .expect("watcher channel closed");

    let router = Router::from_config(&reloaded).unwrap();
    assert!(router.resolve("/login").is_ok());
}
