//! Error types for testmap-engine operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for environmental failures.
///
/// Resolution failures never appear here. They travel as
/// [`DiagnosticRecord`](crate::diagnostics::DiagnosticRecord) values inside
/// the operation's return value, so one file's failure cannot abort a batch.
#[derive(Error, Debug)]
pub enum TestMapError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Search failed under {path}: {message}")]
    Search { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to obtain or deserialize a package manifest dump.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Malformed manifest dump: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Manifest dump is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("No manifest available for {0}")]
    Unavailable(PathBuf),
}

/// Result type alias for testmap-engine operations
pub type Result<T> = std::result::Result<T, TestMapError>;
