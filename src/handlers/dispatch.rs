// Dispatch handler: resolves any unclaimed request path to a service

use axum::{
    extract::{Query, State},
    http::Uri,
    Json,
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    domain::{Parameters, Resolution},
    error::AppError,
    AppState,
};

// GET /* - Resolve the request path
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
    uri: Uri,
) -> Result<Json<Resolution>, AppError> {
    let path = uri.path();
    let mut resolution = state
        .registry
        .load()
        .resolve(path)
        .ok_or_else(|| AppError::NotFound(format!("No route for '{}'", path)))?;

    // Path variables take precedence over query parameters of the same name
    let from_path: HashSet<String> = resolution
        .parameters
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();

    for (name, value) in &query {
        if !from_path.contains(name) {
            resolution.parameters.add(name, value);
        }
    }

    Ok(Json(resolution))
}
