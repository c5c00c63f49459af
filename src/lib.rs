pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::{path::PathBuf, sync::Arc};
use tower_http::trace::TraceLayer;

use domain::{Registry, SharedRegistry, TemplateCache};

pub use domain::{
    compile, Expandable, Matchable, Parameters, RegistryBuilder, Resolution, Template,
    UriParameters,
};
pub use error::FuriError;

// Application state
pub struct AppState {
    pub registry: SharedRegistry,
    pub cache: TemplateCache,
    /// Route file used by reloads
    pub config_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(registry: Registry, config_path: Option<PathBuf>) -> Self {
        Self {
            registry: SharedRegistry::new(registry),
            cache: TemplateCache::default(),
            config_path,
        }
    }
}

// Public function to create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/_furi/routes", get(handlers::admin::list_routes))
        .route("/_furi/reload", post(handlers::admin::reload))
        .route("/_furi/expand", get(handlers::links::expand_template))
        .route("/_furi/expand/{service}", get(handlers::links::expand_service))
        .route("/_furi/redirect/{service}", get(handlers::links::redirect))
        // Everything else is dispatched through the registry
        .fallback(handlers::dispatch::dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
