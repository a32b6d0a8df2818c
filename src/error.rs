//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for all error conditions and implements Axum's
//! `IntoResponse` to automatically convert errors to appropriate HTTP responses
//! with JSON error bodies.
//!
//! Error mappings:
//! - `RepoNotFound`, `PathNotFound` → 404
//! - `InvalidPath`, `InvalidParameter` → 400
//! - `Cancelled` → 503
//! - `Timeout` → 504
//! - `Git`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("History lookup cancelled")]
    Cancelled,

    #[error("History lookup timed out after {0} ms")]
    Timeout(u128),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Git(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RepoNotFound(_) | AppError::PathNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidPath(_) | AppError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        let cases = [
            (AppError::PathNotFound("a.txt".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidPath(String::new()), StatusCode::BAD_REQUEST),
            (AppError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Timeout(10), StatusCode::GATEWAY_TIMEOUT),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn path_not_found_names_the_path() {
        let error = AppError::PathNotFound("src/lib.rs".to_string());
        assert_eq!(error.to_string(), "Path not found: src/lib.rs");
    }
}
