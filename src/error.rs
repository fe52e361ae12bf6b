//! Error types for the calendar importer

use thiserror::Error;

/// Errors that can abort an import
#[derive(Debug, Error)]
pub enum ImportError {
    /// The input text could not be tokenized into a consistent row/column
    /// structure. Fatal for the whole import; `line` points at the record
    /// where structure broke down (0 when the parser could not say).
    #[error("malformed input at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Zero day records were recovered from otherwise well-formed input.
    /// The parser itself never raises this; plan building and the CLI
    /// treat an empty import as a rejected one.
    #[error("no day records recovered from input")]
    EmptyImport,
}
