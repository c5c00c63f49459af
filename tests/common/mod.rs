// Common test utilities shared across test files

use furi::{config::RouteTable, domain::Registry, AppState};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

pub const ROUTES: &str = r#"
types:
  - name: year
    pattern: "[0-9]{4}"
routes:
  - pattern: /
    service: root
  - pattern: /index.html
    service: home
  - pattern: /{+path}.psml
    service: publication
  - pattern: /docs/index.html
    service: docs-home
    home: true
  - pattern: /products/{int:id}
    service: product
  - pattern: /archive/{year:y}{/month}
    service: archive
  - pattern: /search{?q,page}
    service: search
"#;

/// Write route declarations to a temporary file
#[allow(dead_code)]
pub fn write_routes(yml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yml.as_bytes())
        .expect("Failed to write route file");
    file
}

/// Build the shared test registry
#[allow(dead_code)]
pub fn registry() -> Registry {
    let settings = serde_yaml::from_str(ROUTES).expect("Invalid test routes");
    RouteTable::build(settings).expect("Failed to build test registry")
}

/// Create a test Axum router backed by the shared test registry
#[allow(dead_code)]
pub fn create_test_app(config_path: Option<PathBuf>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(registry(), config_path));
    (furi::create_router(Arc::clone(&state)), state)
}
