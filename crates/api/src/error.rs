//! API error types with HTTP response mapping.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ErrorKind};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorKind, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorKind::NotFound, msg.clone()),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorKind::Validation, msg.clone())
            }
            ApiError::Domain(err) => {
                let kind = err.kind();
                let status = match kind {
                    ErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Conflict => StatusCode::CONFLICT,
                    ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match kind {
                    ErrorKind::Storage => "Server error".to_string(),
                    _ => err.to_string(),
                };
                (status, kind, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();

        let mut body = serde_json::json!({
            "success": false,
            "error": kind.code(),
            "message": message,
        });

        if let ApiError::Domain(err) = &self {
            if kind == ErrorKind::Storage {
                tracing::error!(error = %err, "internal server error");
                if cfg!(debug_assertions) {
                    body["detail"] = serde_json::Value::String(err.to_string());
                }
            }
        }

        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}
