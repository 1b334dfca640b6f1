use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SalesError>;

/// Failures raised while loading a sales workbook.
///
/// A load either produces a complete dataset or one of these errors; callers
/// never observe a partially loaded record set.
#[derive(Debug, Error)]
pub enum LoadError {
    /// One of the two required product sheets is absent.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// The header row of a sheet does not carry the expected columns.
    #[error("malformed header in sheet '{sheet}': {reason}")]
    MalformedHeader { sheet: String, reason: String },

    /// The workbook itself could not be opened or parsed.
    #[error("unreadable workbook: {0}")]
    UnreadableFile(#[from] calamine::XlsxError),
}

/// Error type covering the different failure cases that can occur when the
/// crate loads, aggregates, or exports sales data.
#[derive(Debug, Error)]
pub enum SalesError {
    /// Raised by the workbook loader.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when writing CSV output fails.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when a region alias configuration contradicts itself.
    #[error("invalid alias table: {0}")]
    InvalidAliasTable(String),

    /// Raised when the export target cannot be determined.
    #[error("unsupported export target: {0}")]
    UnsupportedExport(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
