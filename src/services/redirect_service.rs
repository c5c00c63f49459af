// Redirect service - builds link and redirect targets from registered services

use crate::{
    domain::{Expandable, Parameters, Registry, UriParameters},
    error::AppError,
};
use std::collections::HashSet;

/// Result of redirect resolution
#[derive(Debug, PartialEq)]
pub enum RedirectResult {
    /// Expanded target, including leftover parameters as a query string
    Location(String),
    /// Unknown service
    NotFound(String),
}

/// Service for building redirect URLs
pub struct RedirectService;

impl RedirectService {
    /// Expand the service's template and append every parameter the template
    /// does not consume as a query string.
    pub fn redirect_url(
        registry: &Registry,
        service: &str,
        parameters: &UriParameters,
    ) -> RedirectResult {
        let Some(template) = registry.template_for(service) else {
            return RedirectResult::NotFound(service.to_string());
        };

        let mut url = template.expand(parameters);

        let consumed: HashSet<&str> = template
            .variables()
            .into_iter()
            .map(|v| v.name.as_str())
            .collect();
        let query = Self::build_query_string(parameters, &consumed);

        if !query.is_empty() {
            // The query goes before any fragment
            let end = url.find('#').unwrap_or(url.len());
            let joiner = if url[..end].contains('?') { '&' } else { '?' };
            url.insert_str(end, &format!("{}{}", joiner, query));
        }

        RedirectResult::Location(url)
    }

    fn build_query_string(parameters: &UriParameters, consumed: &HashSet<&str>) -> String {
        parameters
            .names()
            .into_iter()
            .filter(|name| !consumed.contains(name))
            .flat_map(|name| {
                parameters
                    .values(name)
                    .unwrap_or_default()
                    .iter()
                    .map(move |v| format!("{}={}", urlencoding::encode(name), urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl RedirectResult {
    pub fn into_response(self) -> axum::response::Response {
        use axum::response::{IntoResponse, Redirect};

        match self {
            RedirectResult::Location(url) => Redirect::to(&url).into_response(),
            RedirectResult::NotFound(service) => {
                AppError::NotFound(format!("Unknown service: '{}'", service)).into_response()
            }
        }
    }
}
