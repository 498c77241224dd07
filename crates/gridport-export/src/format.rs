//! Output format selection and its constant extension/MIME table.

use serde::{Deserialize, Serialize};

/// Target output format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Spreadsheet (zip+XML container).
    #[default]
    Excel,
    /// Delimited text.
    Csv,
    /// Delimited text with a UTF-8 BOM for Excel compatibility.
    CsvExcel,
}

impl ExportFormat {
    /// File extension used by the calling layer.
    pub const fn file_extension(self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv | ExportFormat::CsvExcel => "csv",
        }
    }

    /// Canonical content type for response headers.
    pub const fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv | ExportFormat::CsvExcel => "text/csv",
        }
    }

    pub const fn is_delimited(self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::CsvExcel)
    }
}
