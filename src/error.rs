// src/error.rs

use thiserror::Error;

/// Core error types for gomerge
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed go.mod syntax
    #[error("{file}:{line}: {message}")]
    ParseError {
        file: String,
        line: usize,
        message: String,
    },

    /// A go.sum line did not have exactly three fields
    #[error("go.sum line {line}: expected 3 fields, found {fields}")]
    MalformedLine { line: usize, fields: usize },

    /// A manifest could not be serialized
    #[error("Failed to format go.mod: {0}")]
    FormatError(String),

    /// Two different hashes were recorded for the same go.sum entry
    #[error("Hash mismatch for {key}: {existing} != {incoming}")]
    HashMismatch {
        key: String,
        existing: String,
        incoming: String,
    },

    /// The file being merged is not a Go module file
    #[error("File is not a go module file: {0}")]
    UnknownFile(String),
}

impl Error {
    /// Whether this error is a merge conflict rather than a tool failure
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::HashMismatch { .. })
    }
}

/// Result type alias using gomerge's Error type
pub type Result<T> = std::result::Result<T, Error>;
