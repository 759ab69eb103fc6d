//! Pipeline-layer errors (§4.2, §7 kind 2).

use thiserror::Error;

/// Failure of the pipeline state machine.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested tool isn't in the session's current allowlist. Maps to
    /// HTTP 409 with `{expected_next: [...]}` at the gateway boundary.
    #[error("tool not allowed in current pipeline state")]
    OutOfOrder {
        /// The allowlist the session actually held when the check ran.
        expected_next: Vec<String>,
    },
    /// No session exists with the given id.
    #[error("unknown session {0}")]
    UnknownSession(String),
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
