//! API error type and HTTP response mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::search::SearchError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// External provider failure (502)
    #[error("Provider error: {0}")]
    Provider(#[from] ExportError),

    /// Music-data search failure (502)
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// No music-data search endpoint configured (503)
    #[error("music search is not configured")]
    SearchUnavailable,

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Provider(ref err) => match err {
                ExportError::UnknownProvider(_) | ExportError::MissingCredential(_) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
                }
                _ => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", err.to_string()),
            },
            ApiError::Search(ref err) => {
                (StatusCode::BAD_GATEWAY, "SEARCH_ERROR", err.to_string())
            }
            ApiError::SearchUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SEARCH_UNAVAILABLE",
                "music search is not configured".to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
