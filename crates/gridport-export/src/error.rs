//! Error types for export operations.

use thiserror::Error;

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Row count exceeded the configured maximum under the abort
    /// policy. Expected, user-facing condition; bytes already written
    /// to the sink are not retracted and must be discarded by the
    /// caller.
    #[error("row count exceeds the configured maximum of {max_rows} rows per sheet")]
    RowLimitExceeded { max_rows: u32 },

    /// The CSV fallback overflow strategy is a reserved extension
    /// point and fails fast when selected.
    #[error("overflow strategy CsvFallback is not implemented")]
    CsvFallbackUnimplemented,

    /// Invalid export configuration or schema.
    #[error("invalid export configuration: {0}")]
    Config(String),

    /// Sink or backing-storage I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Spreadsheet container encoding failure.
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// Delimited-text encoding failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Corrupt access-window backing storage.
    #[error("row spill error: {0}")]
    Spill(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
