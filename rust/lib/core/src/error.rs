use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error types ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers reported in `error_type`.
// Clients match on these, never on `error_message`.

/// Stable `error_type` constants.
///
/// Error bodies look like
/// `{"result": "false", "error_type": "TweetIndexError", "error_message": "..."}`.
pub mod error_type {
    pub const ENTRY_NOT_PRESENT: &str = "EntryNotPresent";
    pub const TWEET_INDEX: &str = "TweetIndexError";
    pub const VALIDATION: &str = "ValidationError";
    pub const UNAUTHENTICATED: &str = "Unauthenticated";
    pub const STORAGE: &str = "StorageError";
    pub const INTERNAL: &str = "InternalError";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// Not every variant is rendered as an error. `NotFound` is answered with a
/// success-shaped `200 null`: a caller asking for something absent gets an
/// empty answer, not a failure. `TweetIndex` is the deliberate exception and
/// always renders as a structured 400.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Referenced user, tweet or media does not exist. HTTP 200 `null`.
    #[error("{0}")]
    NotFound(String),

    /// Tried to remove a like or follow edge that does not exist. HTTP 400.
    #[error("{0}")]
    EntryNotPresent(String),

    /// Caller does not own a tweet with the given id. HTTP 400.
    #[error("{0}")]
    TweetIndex(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing caller identity token. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Storage backend failure. HTTP 400 (catch-all).
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 400 (catch-all).
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable `error_type` for the response body. `None` for `NotFound`,
    /// which is not rendered as an error.
    pub fn error_type(&self) -> Option<&'static str> {
        match self {
            ServiceError::NotFound(_) => None,
            ServiceError::EntryNotPresent(_) => Some(error_type::ENTRY_NOT_PRESENT),
            ServiceError::TweetIndex(_) => Some(error_type::TWEET_INDEX),
            ServiceError::Validation(_) => Some(error_type::VALIDATION),
            ServiceError::Unauthorized(_) => Some(error_type::UNAUTHENTICATED),
            ServiceError::Storage(_) => Some(error_type::STORAGE),
            ServiceError::Internal(_) => Some(error_type::INTERNAL),
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::OK,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::EntryNotPresent(_)
            | ServiceError::TweetIndex(_)
            | ServiceError::Validation(_)
            | ServiceError::Storage(_)
            | ServiceError::Internal(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self.error_type() {
            None => serde_json::Value::Null,
            Some(kind) => serde_json::json!({
                "result": "false",
                "error_type": kind,
                "error_message": self.to_string(),
            }),
        };
        (status, axum::Json(body)).into_response()
    }
}

// Extractor failures (bad `{id}`, malformed JSON) use the same error shape.

impl From<PathRejection> for ServiceError {
    fn from(e: PathRejection) -> Self {
        ServiceError::Validation(e.body_text())
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(e: JsonRejection) -> Self {
        ServiceError::Validation(e.body_text())
    }
}
