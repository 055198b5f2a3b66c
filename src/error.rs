//! Global error handling for contextify
//!
//! Recoverable per-file problems never travel through this type; they are
//! reported to a [`crate::diagnostics::DiagnosticSink`] and the run continues.
//! Everything here is fatal for the run that raised it.

use std::io;

use thiserror::Error;

/// Global error type for contextify operations
#[derive(Error, Debug)]
pub enum ContextifyError {
    /// Configuration errors, reported before any output I/O begins
    #[error("{0}")]
    Config(String),

    /// The ignore file exists but could not be read
    #[error("error loading ignore file: {0}")]
    IgnoreFile(#[source] io::Error),

    /// Directory walk errors while collecting files
    #[error("error walking directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A write to the output sink failed; `stage` names the write that broke
    #[error("error writing {stage}: {source}")]
    Write {
        stage: String,
        #[source]
        source: io::Error,
    },

    /// File system errors outside the aggregation pipeline
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Specialized Result type for contextify operations
pub type Result<T> = std::result::Result<T, ContextifyError>;
