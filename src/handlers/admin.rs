// Registry administration handlers

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::{config::RouteTable, domain::RouteInfo, error::AppError, AppState};

#[derive(Serialize)]
pub struct ReloadSummary {
    pub routes: usize,
    pub previous: usize,
}

// GET /_furi/routes - Registered routes in precedence order
pub async fn list_routes(State(state): State<Arc<AppState>>) -> Json<Vec<RouteInfo>> {
    Json(state.registry.load().routes())
}

// POST /_furi/reload - Rebuild the registry from the configuration file
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadSummary>, AppError> {
    let path = state
        .config_path
        .clone()
        .ok_or_else(|| AppError::BadRequest("No route file configured".to_string()))?;

    let registry = tokio::task::spawn_blocking(move || RouteTable::load(Some(&path)))
        .await
        .map_err(|e| AppError::Internal(format!("Reload task failed: {}", e)))??;

    let routes = registry.len();
    let previous = state.registry.replace(registry).len();
    info!(routes, previous, "Routes reloaded");

    Ok(Json(ReloadSummary { routes, previous }))
}
