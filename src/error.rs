//! Error types for causalcheck.
//!
//! Rule violations found in a graph are never errors: they are reported as
//! [`ValidationIssue`](crate::issue::ValidationIssue)s. The types here cover
//! contract violations by the caller (a document that is not a graph at all),
//! invalid configuration, and serialization failures.

use thiserror::Error;

/// Configuration errors raised by [`EngineConfig::validate`](crate::config::EngineConfig::validate).
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid range for '{field}': min ({min}) must not exceed max ({max})")]
    InvertedRange {
        field: String,
        min: f64,
        max: f64,
    },

    #[error("Limit '{field}' must be > 0")]
    ZeroLimit {
        field: String,
    },

    #[error("Threshold '{field}' must be finite, got {value}")]
    NonFiniteThreshold {
        field: String,
        value: f64,
    },
}

/// Top-level error type for causalcheck.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input does not satisfy the graph contract (for example a document
    /// without `nodes` or `edges`). Distinct from a validation issue.
    #[error("Precondition failed: {message}")]
    Precondition {
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
    },

    /// A telemetry sink refused an event. Never surfaced by the pipeline,
    /// which logs and continues.
    #[error("Telemetry sink '{sink}' failed: {message}")]
    Telemetry {
        sink: String,
        message: String,
    },
}

impl EngineError {
    /// Creates a precondition error.
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Returns true if this is a caller contract violation.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Creates a telemetry error.
    #[must_use]
    pub fn telemetry(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Telemetry {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is a serialization error.
    #[must_use]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

/// Result type alias for causalcheck operations.
pub type EngineResult<T> = Result<T, EngineError>;
