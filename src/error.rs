use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ApiError
///
/// The client-visible failure taxonomy. Every handler funnels its failures
/// through this enum so that callers always receive a machine-checkable kind
/// plus a human-readable reason, and internal storage errors are never
/// leaked verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid credential on a path that needs one.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but lacking the required role or ownership.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate login, double publish, self-ban toggle, unique-key race.
    #[error("{0}")]
    Conflict(String),

    /// Field constraint violations; the message enumerates allowed literal
    /// values where relevant.
    #[error("{0}")]
    Validation(String),

    /// Storage-layer failure. Logged at the repository boundary; the client
    /// only ever sees an opaque message.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    /// Stable lowercase discriminator rendered into the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) => "validation",
            ApiError::Internal => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorBody
///
/// The JSON wire shape for every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            kind: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
