//! API error types with IntoResponse
//!
//! Errors are converted to `{"success": false, "error": ...}` JSON responses.
//! Backend error text is logged, never returned.

use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// No route matched (404)
    NotFound,

    /// A path parameter could not be extracted, e.g. invalid UTF-8 (400)
    InvalidPath(PathRejection),

    /// Storage failed or returned unusable data (500, logged)
    Database(DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound => (StatusCode::NOT_FOUND, "not found"),
            Self::InvalidPath(rejection) => {
                tracing::debug!("Rejected path: {}", rejection.body_text());
                (StatusCode::BAD_REQUEST, "invalid path parameter")
            }
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "an internal error occurred")
            }
        };

        let body = json!({
            "success": false,
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidPath(rejection)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}
