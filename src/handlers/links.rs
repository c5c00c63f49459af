// Link generation handlers: expansion and redirects

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    domain::{Expandable, UriParameters},
    error::AppError,
    services::redirect_service::RedirectService,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct Expansion {
    pub url: String,
}

// GET /_furi/expand/{service} - Expand the template registered for a service
pub async fn expand_service(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Expansion>, AppError> {
    let parameters: UriParameters = query.into_iter().collect();
    let url = state
        .registry
        .load()
        .expand(&service, &parameters)
        .ok_or_else(|| AppError::NotFound(format!("Unknown service: '{}'", service)))?;

    Ok(Json(Expansion { url }))
}

// GET /_furi/expand?template=... - Expand an ad-hoc template
pub async fn expand_template(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Expansion>, AppError> {
    let mut pattern = None;
    let mut parameters = UriParameters::new();
    for (name, value) in query {
        if name == "template" && pattern.is_none() {
            pattern = Some(value);
        } else {
            parameters.add(&name, &value);
        }
    }

    let pattern =
        pattern.ok_or_else(|| AppError::BadRequest("Missing 'template' parameter".to_string()))?;
    let template = state.cache.get_or_compile(&pattern)?;

    Ok(Json(Expansion {
        url: template.expand(&parameters),
    }))
}

// GET /_furi/redirect/{service} - Redirect to the expanded service URL
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let parameters: UriParameters = query.into_iter().collect();
    let registry = state.registry.load();
    RedirectService::redirect_url(&registry, &service, &parameters).into_response()
}
