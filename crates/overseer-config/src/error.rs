//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A field was present but out of its declared valid range.
    #[error("invalid value for {field}: {message}")]
    Validation {
        /// Dotted field path, e.g. `"rate_limits.per_minute"`.
        field: String,
        /// Human-readable description of the violation.
        message: String,
    },

    /// A profile name was requested that doesn't resolve to a built-in or
    /// stored table — callers should fall back to the built-in default
    /// rather than treat this as fatal; kept as a distinct variant so the
    /// resolver can log it at `warn!` before falling back.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

/// Result alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
