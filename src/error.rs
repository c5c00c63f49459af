// Error handling for furi

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Errors raised while compiling templates or building a registry
#[derive(Debug, Error)]
pub enum FuriError {
    #[error("Malformed template '{pattern}' at position {position}: {reason}")]
    MalformedTemplate {
        pattern: String,
        position: usize,
        reason: String,
    },

    #[error("Invalid pattern for variable type '{name}': {source}")]
    InvalidType {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Variable type '{0}' must not contain capture groups")]
    CapturingType(String),

    #[error("Regular expression error: {0}")]
    Regex(#[from] regex::Error),
}

impl FuriError {
    pub(crate) fn malformed(pattern: &str, position: usize, reason: impl Into<String>) -> Self {
        FuriError::MalformedTemplate {
            pattern: pattern.to_string(),
            position,
            reason: reason.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Implement IntoResponse so Axum can convert errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

// Malformed ad-hoc templates are the caller's fault
impl From<FuriError> for AppError {
    fn from(err: FuriError) -> Self {
        match err {
            FuriError::MalformedTemplate { .. } => AppError::BadRequest(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}
