//! Error types for the kiosk API server.
//!
//! [`ApiError`] maps every failure a handler can see onto an HTTP status
//! and a JSON body of the form `{"error": message, "status": code}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use kultoura_core::admin::AdminError;
use kultoura_scoring::{SaveError, ScoringError};

/// Errors that can occur in the kiosk API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The event is not in the catalog.
    #[error("unknown event: {0}")]
    NotFound(String),

    /// The request named an unknown team, carried a malformed body or
    /// failed score validation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The store or the score sink failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::UnknownEvent(event_id) => Self::NotFound(event_id),
            AdminError::UnknownTeam { .. } => Self::BadRequest(err.to_string()),
            AdminError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::Save(e) => Self::from(e),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<SaveError> for ApiError {
    fn from(err: SaveError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(event_id) => {
                (StatusCode::NOT_FOUND, format!("unknown event: {event_id}"))
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
