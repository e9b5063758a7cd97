//! Shared fixtures for integration tests.

use std::path::PathBuf;

use path_router::{Params, RouteConfig, Router, RouterConfig};

/// Path of a sample declaration shipped under `routes/`.
#[allow(dead_code)]
pub fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("routes").join(name)
}

/// Build a parameter map from string pairs.
#[allow(dead_code)]
pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Exam table with a nested child and a catch-all default route.
#[allow(dead_code)]
pub fn exam_config() -> RouterConfig {
    let mut config = RouterConfig::default();
    config.settings.default_route = Some("NotFound".into());
    config.routes = vec![
        RouteConfig::new("/").with_redirect("/home"),
        RouteConfig::new("/home")
            .with_name("Home")
            .with_view("HomeView")
            .with_meta("title", "考试管理"),
        RouteConfig::new("/exam/:exam_id")
            .with_name("ExamDetail")
            .with_view("ExamDetailView")
            .with_meta("title", "考试详情")
            .with_child(
                RouteConfig::new("papers")
                    .with_name("ExamPapers")
                    .with_view("ExamPapersView"),
            )
            .with_child(
                RouteConfig::new("papers/:paper_id")
                    .with_name("PaperDetail")
                    .with_view("PaperDetailView"),
            ),
        RouteConfig::new("/students")
            .with_name("StudentManage")
            .with_view("StudentManageView"),
        RouteConfig::new("/*rest")
            .with_name("NotFound")
            .with_view("NotFoundView"),
    ];
    config
}

#[allow(dead_code)]
pub fn exam_router() -> Router {
    Router::from_config(&exam_config()).expect("exam fixture is valid")
}

/// Write `contents` to a fresh file in the system temp directory.
#[allow(dead_code)]
pub fn write_temp(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("path-router-{}-{}", std::process::id(), name));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
