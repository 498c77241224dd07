//! Streaming tabular export to spreadsheets and delimited text.
//!
//! This crate turns a sequence of typed records, described by the
//! declarative schemas in `gridport-model`, into a multi-sheet styled
//! workbook or a CSV document under bounded memory:
//!
//! - a streaming sheet writer keeps only a bounded access window of
//!   rows resident and spills older rows to temp storage;
//! - a style cache dedupes structurally equal styles to stay under the
//!   platform's distinct-style ceiling;
//! - an overflow controller decides what happens at the sheet row
//!   limit (split into numbered sheets, abort with a typed error, or
//!   fail fast on the reserved CSV fallback);
//! - the delimited writer escapes per RFC 4180 with an optional UTF-8
//!   BOM for Excel.
//!
//! # Example
//!
//! ```
//! use gridport_export::{ExportFormat, ExportOptions, export};
//! use gridport_model::{ColumnMeta, Exportable, Schema, SheetMeta};
//!
//! struct Reading {
//!     probe: String,
//!     value: f64,
//! }
//!
//! impl Exportable for Reading {
//!     fn schema() -> Schema<Self> {
//!         Schema::new(
//!             SheetMeta::new("Readings"),
//!             vec![
//!                 ColumnMeta::new("Probe", |r: &Reading| r.probe.as_str().into()).with_order(1),
//!                 ColumnMeta::new("Value", |r: &Reading| r.value.into()).with_order(2),
//!             ],
//!         )
//!     }
//! }
//!
//! let records = vec![Reading { probe: "A1".to_string(), value: 0.25 }];
//! let mut out = Vec::new();
//! let summary = export(&records, &mut out, &ExportOptions::new(ExportFormat::Csv)).unwrap();
//! assert_eq!(summary.rows, 1);
//! assert_eq!(String::from_utf8(out).unwrap(), "Probe,Value\nA1,0.25\n");
//! ```

pub mod delimited;
pub mod error;
pub mod exporter;
pub mod format;
pub mod overflow;
pub mod sheet;
pub mod style;

pub use delimited::{DelimitedOptions, DelimitedTextWriter, UTF8_BOM};
pub use error::{ExportError, Result};
pub use exporter::{
    ChunkSource, ExportOptions, ExportSummary, SheetSummary, export, export_chunks,
};
pub use format::ExportFormat;
pub use overflow::{EXCEL_MAX_ROWS, OverflowController, RowDisposition};
pub use sheet::{DEFAULT_WINDOW_ROWS, SheetPlan, StreamingSheetWriter};
pub use style::{MAX_STYLES, StyleCache, StyleId};
