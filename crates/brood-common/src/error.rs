//! Unified error types for the brood workspace.
//!
//! Lifecycle guard failures live in [`MonitorError`] and are folded into
//! [`BroodError`] so that every orchestrator operation reports through one
//! type.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{Id, Language};

pub use crate::monitor::MonitorError;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BroodError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A container exists but exposes no engine for the requested language.
    #[error("container {id} does not support {language}")]
    LanguageNotSupported {
        /// Container that was selected.
        id: Id,
        /// Language that was requested.
        language: Language,
    },

    /// Raw configuration could not be assembled into a container.
    #[error("failed to assemble container {id}: {source}")]
    Assembly {
        /// Target container id.
        id: Id,
        /// Opaque failure reported by the assembler.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A container refused to activate.
    #[error("failed to activate container {id}: {message}")]
    Activation {
        /// Container that failed to activate.
        id: Id,
        /// Description of the unmet precondition.
        message: String,
    },

    /// No assembler is registered for the given configuration format.
    #[error("unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The requested format tag.
        format: String,
    },

    /// A name or format tag contains characters the config store rejects.
    #[error("illegal characters in label <{label}> - allowed are [a-z, A-Z, 0-9, _, ., -]")]
    IllegalLabel {
        /// The rejected label.
        label: String,
    },

    /// The config store lock could not be acquired in time.
    #[error("config store busy, gave up after {waited:?}")]
    StoreBusy {
        /// How long the caller waited.
        waited: Duration,
    },

    /// The lifecycle guard rejected the operation.
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl BroodError {
    /// Wraps an assembler failure for the container `id`.
    pub fn assembly(id: &Id, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Assembly {
            id: id.clone(),
            source: source.into(),
        }
    }

    /// Returns `true` if the operation was rejected because the guard was in
    /// the wrong lifecycle state.
    #[must_use]
    pub const fn is_illegal_state(&self) -> bool {
        matches!(self, Self::Monitor(MonitorError::IllegalState { .. }))
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BroodError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MonitorState;

    #[test]
    fn not_found_names_the_id() {
        let err = BroodError::NotFound {
            kind: "container",
            id: "public".into(),
        };
        assert_eq!(err.to_string(), "container not found: public");
    }

    #[test]
    fn assembly_keeps_the_original_cause() {
        let err = BroodError::assembly(&Id::new("broken"), "mapping has no database");
        let source = std::error::Error::source(&err).expect("cause preserved");
        assert_eq!(source.to_string(), "mapping has no database");
    }

    #[test]
    fn monitor_errors_are_transparent() {
        let err: BroodError = MonitorError::IllegalState {
            expected: MonitorState::Active,
            actual: MonitorState::Inactive,
        }
        .into();
        assert!(err.is_illegal_state());
        assert_eq!(err.to_string(), "monitor is inactive, expected active");
    }
}
