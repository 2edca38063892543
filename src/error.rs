use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that can occur while loading a parameter
/// dataset or exporting the comparison report.
///
/// Classification and joining never fail: malformed rows and unknown source
/// tags degrade to empty results instead of surfacing here.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the CSV reader rejects the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when JSON serialization of a query result fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the input does not follow the expected dataset layout.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Raised when a required column header is absent from the input.
    #[error("missing column '{0}' in dataset header")]
    MissingColumn(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a parameter code is not part of the selected group.
    #[error("parameter '{code}' is not listed in group '{group}'")]
    UnknownCode { group: String, code: String },

    /// Raised when a selection step is requested out of order.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
