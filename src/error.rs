//! Error types for diagram extraction.
//!
//! Most variants are per-file and recoverable: the graph builder logs
//! them and moves on. Only configuration problems stop a run.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, UmlError>;

#[derive(Error, Debug)]
pub enum UmlError {
    /// A tracked identifier could not be turned into type metadata.
    #[error("Cannot resolve type {identifier}: {reason}")]
    UnresolvableType { identifier: String, reason: String },

    /// A line looks like a relationship call but no target argument
    /// could be captured.
    #[error("Malformed relationship expression at {path}:{line}: {text}")]
    MalformedRelationshipExpression {
        path: PathBuf,
        line: usize,
        text: String,
    },

    /// A referenced identifier is not part of the tracked universe.
    #[error("Untracked reference to {identifier}")]
    UntrackedReference { identifier: String },

    /// A source file could not be read.
    #[error("Cannot read {path}: {source}")]
    FileReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is missing or invalid.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A relationship kind produced an invalid scanning pattern.
    #[error("Invalid relationship pattern: {source}")]
    Pattern {
        #[from]
        source: regex::Error,
    },
}

impl UmlError {
    pub fn unresolvable(identifier: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvableType {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
