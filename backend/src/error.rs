// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::flow::{ErrorKind, FlowError};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (duplicate join, answer given twice, flow already closed)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Maps the quiz-flow taxonomy onto HTTP classes.
/// Storage failures never leak their details to the client.
impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => AppError::NotFound(msg),
            ErrorKind::Conflict | ErrorKind::InvalidState => AppError::Conflict(msg),
            ErrorKind::Validation => AppError::BadRequest(msg),
            ErrorKind::Storage => AppError::InternalServerError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// A blocking task panicked or was cancelled.
impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    fn status_of(err: FlowError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn flow_errors_map_to_status_classes() {
        assert_eq!(
            status_of(FlowError::FlowNotFound("a:b".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(FlowError::AlreadyAnswered("q".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(FlowError::FlowClosed), StatusCode::CONFLICT);
        assert_eq!(
            status_of(FlowError::InvalidEntity("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(FlowError::Storage(StoreError::io(
                "x",
                std::io::Error::other("disk full")
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
