// src/error.rs

use thiserror::Error;

/// Core error types for Wheelhouse
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors (directory creation, temp-file write, rename)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The wheel archive itself could not be read
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Wheel filename does not carry a name and version
    #[error("Invalid wheel filename: {0}")]
    InvalidWheelFilename(String),

    /// Zero or multiple `.dist-info` candidates at the archive top level
    #[error("Expected exactly one metadata directory matching {expected}, found {found}")]
    MetadataResolution { expected: String, found: usize },

    /// The RECORD declares a path the archive does not contain
    #[error("Archive entry not found: {0}")]
    EntryNotFound(String),

    /// Content read from the archive does not match its declared digest
    #[error("Hash mismatch for {path}")]
    HashMismatch { path: String },

    /// RECORD declares a digest algorithm we cannot recompute
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(String),

    /// Malformed RECORD row
    #[error("RECORD parse error at line {line}: {reason}")]
    RecordParse { line: usize, reason: String },

    /// Declared path would escape the destination directory
    #[error("Path escapes destination directory: {0}")]
    UnsafePath(String),
}

/// Result type alias using Wheelhouse's Error type
pub type Result<T> = std::result::Result<T, Error>;
