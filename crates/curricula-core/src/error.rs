//! Error types for Curricula operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Curricula crates. Uses `thiserror` for derive macros.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in Curricula operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// The underlying I/O error.
        source: std::io::Error,
        /// The file being read or written.
        path: PathBuf,
    },

    /// A required file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested item not found.
    #[error("Not found: {kind} '{id}'")]
    NotFound {
        /// What kind of item was looked up (e.g. "node").
        kind: String,
        /// The identifier that was not found.
        id: String,
    },

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Input could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A higher-level operation failed.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Create an I/O error without path context.
    pub fn io(err: std::io::Error) -> Self {
        Self::Io(err)
    }

    /// Create an I/O error that remembers the file involved.
    pub fn io_with_path(err: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            source: err,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a file-not-found error.
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::FileNotFound(path.as_ref().to_path_buf())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create an operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Returns `true` for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::FileNotFound(_))
    }
}

/// Result type alias using Curricula's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("node", "limits");
        assert_eq!(err.to_string(), "Not found: node 'limits'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_io_with_path_display() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io_with_path(io, "/data/nodes.json");
        let msg = err.to_string();
        assert!(msg.contains("/data/nodes.json"));
        assert!(msg.contains("denied"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_file_not_found() {
        let err = Error::file_not_found("/missing.json");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("/missing.json"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::other("boom");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(Error::config("x"), Error::Config(_)));
        assert!(matches!(Error::invalid_data("x"), Error::InvalidData(_)));
        assert!(matches!(Error::parse("x"), Error::Parse(_)));
        assert!(matches!(Error::serialization("x"), Error::Serialization(_)));
        assert!(matches!(Error::operation("x"), Error::Operation(_)));
    }
}
