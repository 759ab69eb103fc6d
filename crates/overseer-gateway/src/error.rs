//! Gateway-boundary error type: maps every inner crate's error into an HTTP
//! status plus a JSON body (§7 "Error type layering").
//!
//! This is the one place internal error variants are translated into wire
//! shapes; nothing upstream re-exports a crate's internal error type.

use axum::http::StatusCode as HttpStatus;
use axum::response::{IntoResponse, Response};
use axum::Json;
use overseer_approval::PolicyError;
use overseer_pipeline::PipelineError;
use overseer_storage::StorageError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure the HTTP surface can produce, each carrying enough detail
/// to build its wire response without reaching back into the originating
/// crate's error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A policy-layer check failed (§4.3); `status` is `http_status()`.
    #[error(transparent)]
    Policy(#[from] PolicyError),
    /// The pipeline rejected the call as out of order (§4.2, §7 kind 2).
    #[error("tool not allowed in current pipeline state")]
    OutOfOrder {
        /// The allowlist the session held at the moment of the check.
        expected_next: Vec<String>,
    },
    /// The session named in the path does not exist.
    #[error("unknown session: {0}")]
    UnknownSession(String),
    /// The tool path in `/eyes/{tool-path}` does not name a known Eye.
    #[error("unknown tool path: {0}")]
    UnknownTool(String),
    /// The request body failed to parse as JSON against the expected shape.
    #[error("malformed request body: {0}")]
    BadRequest(String),
    /// A store-layer failure on a critical path (§7 "Store-layer failures
    /// in critical paths ... are 5xx").
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::OutOfOrder { expected_next } => Self::OutOfOrder { expected_next },
            PipelineError::UnknownSession(id) => Self::UnknownSession(id),
        }
    }
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnknownSession(id) => Self::UnknownSession(id),
        }
    }
}

#[derive(Serialize)]
struct DetailBody {
    detail: String,
}

#[derive(Serialize)]
struct OutOfOrderBody {
    message: String,
    expected_next: Vec<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            Self::Policy(err) => {
                let status = err.http_status();
                warn!(status, error = %err, "policy layer rejected request");
                (
                    HttpStatus::from_u16(status).unwrap_or(HttpStatus::FORBIDDEN),
                    Json(DetailBody { detail: err.to_string() }),
                )
                    .into_response()
            },
            Self::OutOfOrder { expected_next } => {
                warn!(?expected_next, "pipeline rejected out-of-order call");
                (
                    HttpStatus::CONFLICT,
                    Json(OutOfOrderBody {
                        message: "tool not allowed in current pipeline state".to_string(),
                        expected_next,
                    }),
                )
                    .into_response()
            },
            Self::UnknownSession(id) => {
                (HttpStatus::NOT_FOUND, Json(DetailBody { detail: format!("unknown session: {id}") })).into_response()
            },
            Self::UnknownTool(path) => {
                (HttpStatus::NOT_FOUND, Json(DetailBody { detail: format!("unknown tool path: {path}") })).into_response()
            },
            Self::BadRequest(detail) => {
                (HttpStatus::BAD_REQUEST, Json(DetailBody { detail })).into_response()
            },
            Self::Internal(detail) => {
                error!(%detail, "internal gateway error");
                (
                    HttpStatus::INTERNAL_SERVER_ERROR,
                    Json(DetailBody { detail: "internal error".to_string() }),
                )
                    .into_response()
            },
        }
    }
}

/// Shorthand for a handler result.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// A standalone 404/400 JSON body, used where no richer [`GatewayError`]
/// variant applies (kept trivial on purpose; see `error.rs`'s `DetailBody`).
#[must_use]
pub fn detail_json(detail: impl Into<String>) -> serde_json::Value {
    json!({ "detail": detail.into() })
}
