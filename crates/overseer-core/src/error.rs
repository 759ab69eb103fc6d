//! Error types shared by the envelope and tool-registry layers.

use thiserror::Error;

/// Errors that can occur while building or validating an envelope.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The tool path does not name a known Eye.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The status code is not a member of the closed registry.
    #[error("unknown status code: {0}")]
    UnknownStatusCode(String),

    /// A response envelope carried a `data` key outside the per-Eye registry.
    #[error("data key `{key}` is not registered for {tag}")]
    UnregisteredDataKey {
        /// The offending key.
        key: String,
        /// The Eye tag the envelope was built for.
        tag: String,
    },
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
