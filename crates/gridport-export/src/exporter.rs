//! Export facade: schema lookup, header/row/finish orchestration.
//!
//! Two entry points share one job: [`export`] iterates a materialized
//! slice, [`export_chunks`] pulls batches from a [`ChunkSource`] so
//! only one chunk is resident at a time. Row order is exactly
//! presentation order on both paths.

use std::io::Write;
use std::sync::Arc;

use gridport_model::{
    CellStyleSpec, CellValue, Exportable, Schema, SchemaCache, to_cell,
};
use serde::{Deserialize, Serialize};

use crate::delimited::{DelimitedOptions, DelimitedTextWriter};
use crate::error::{ExportError, Result};
use crate::format::ExportFormat;
use crate::overflow::{EXCEL_MAX_ROWS, OverflowController, RowDisposition};
use crate::sheet::{DEFAULT_WINDOW_ROWS, SheetPlan, StreamingSheetWriter};

/// Options for one export call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Physical row ceiling per sheet; small values are allowed for
    /// testability.
    pub max_rows_per_sheet: u32,
    /// Rows kept resident by the streaming writer.
    pub window_rows: usize,
    pub delimiter: u8,
    /// Emit the header line on delimited output.
    pub write_csv_header: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            max_rows_per_sheet: EXCEL_MAX_ROWS,
            window_rows: DEFAULT_WINDOW_ROWS,
            delimiter: b',',
            write_csv_header: true,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_max_rows_per_sheet(mut self, max_rows: u32) -> Self {
        self.max_rows_per_sheet = max_rows;
        self
    }

    pub fn with_window_rows(mut self, window_rows: usize) -> Self {
        self.window_rows = window_rows;
        self
    }

    pub fn with_csv_header(mut self, write_header: bool) -> Self {
        self.write_csv_header = write_header;
        self
    }
}

/// Pull-based batch producer for datasets too large to materialize.
///
/// The producer owns its own cursor state and must not retain
/// previously yielded batches; the exporter holds at most one chunk at
/// a time and writes chunks in arrival order.
pub trait ChunkSource<T> {
    fn next_chunk(&mut self) -> Result<Option<Vec<T>>>;
}

impl<T, I> ChunkSource<T> for I
where
    I: Iterator<Item = Vec<T>>,
{
    fn next_chunk(&mut self) -> Result<Option<Vec<T>>> {
        Ok(self.next())
    }
}

/// Per-sheet slice of a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
    pub data_rows: u32,
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Logical data rows written.
    pub rows: u64,
    /// Sheet segments in creation order; delimited exports report one
    /// pseudo-sheet.
    pub sheets: Vec<SheetSummary>,
}

/// Export a materialized list of records.
pub fn export<T: Exportable, W: Write>(
    records: &[T],
    sink: W,
    options: &ExportOptions,
) -> Result<ExportSummary> {
    let mut job = ExportJob::new(sink, options)?;
    for record in records {
        job.write_record(record)?;
    }
    job.finish()
}

/// Export from a pull-based chunk source.
///
/// Chunks are written in the order received; an empty chunk is skipped.
pub fn export_chunks<T: Exportable, W: Write, S: ChunkSource<T>>(
    mut source: S,
    sink: W,
    options: &ExportOptions,
) -> Result<ExportSummary> {
    let mut job = ExportJob::new(sink, options)?;
    while let Some(chunk) = source.next_chunk()? {
        if chunk.is_empty() {
            continue;
        }
        for record in &chunk {
            job.write_record(record)?;
        }
    }
    job.finish()
}

enum Backend<W: Write> {
    Sheet {
        writer: StreamingSheetWriter,
        overflow: OverflowController,
        sink: W,
    },
    Delimited {
        writer: DelimitedTextWriter<W>,
    },
}

/// Transient per-call state: schema borrowed from the cache, the output
/// backend, the running logical row counter and the per-sheet tally.
struct ExportJob<T: Exportable, W: Write> {
    schema: Arc<Schema<T>>,
    backend: Backend<W>,
    index_body_style: CellStyleSpec,
    next_index: u64,
    sheets: Vec<SheetSummary>,
}

impl<T: Exportable, W: Write> ExportJob<T, W> {
    fn new(sink: W, options: &ExportOptions) -> Result<Self> {
        let schema = SchemaCache::schema_of::<T>();
        validate_schema(&schema)?;

        let base_name = schema.sheet.name.clone();
        let backend = if options.format.is_delimited() {
            let delimited = DelimitedOptions {
                delimiter: options.delimiter,
                write_header: options.write_csv_header,
                include_bom: options.format == ExportFormat::CsvExcel,
            };
            let mut writer = DelimitedTextWriter::new(sink, &delimited)?;
            let headers = header_texts(&schema);
            writer.write_header(headers.iter().map(String::as_str))?;
            Backend::Delimited { writer }
        } else {
            let mut overflow = OverflowController::new(
                schema.sheet.overflow,
                options.max_rows_per_sheet,
                base_name.clone(),
            )?;
            let mut writer = StreamingSheetWriter::new(options.window_rows);
            open_sheet(&schema, &mut writer, &mut overflow, base_name.clone())?;
            Backend::Sheet {
                writer,
                overflow,
                sink,
            }
        };

        Ok(Self {
            schema,
            backend,
            index_body_style: CellStyleSpec::default(),
            next_index: 0,
            sheets: vec![SheetSummary {
                name: base_name,
                data_rows: 0,
            }],
        })
    }

    fn write_record(&mut self, record: &T) -> Result<()> {
        // The logical index is a property of the dataset, not of any
        // one sheet; it keeps counting across overflow boundaries.
        let index = self.next_index + 1;

        match &mut self.backend {
            Backend::Sheet {
                writer, overflow, ..
            } => {
                match overflow.before_row()? {
                    RowDisposition::Continue => {}
                    RowDisposition::NewSheet(name) => {
                        tracing::debug!(sheet = %name, "sheet full; continuing on a new sheet");
                        open_sheet(&self.schema, writer, overflow, name.clone())?;
                        self.sheets.push(SheetSummary { name, data_rows: 0 });
                    }
                }

                let mut cells: Vec<(CellValue, &CellStyleSpec)> =
                    Vec::with_capacity(self.schema.columns().len() + 1);
                if self.schema.sheet.include_index {
                    cells.push((
                        CellValue::Number {
                            value: index as f64,
                            format: "0".to_string(),
                        },
                        &self.index_body_style,
                    ));
                }
                for column in self.schema.columns() {
                    cells.push((
                        to_cell(&column.value(record), column.format.as_deref()),
                        &column.body_style,
                    ));
                }
                writer.write_row(cells)?;
                overflow.on_row();
            }
            Backend::Delimited { writer } => {
                let mut cells: Vec<CellValue> =
                    Vec::with_capacity(self.schema.columns().len() + 1);
                if self.schema.sheet.include_index {
                    cells.push(CellValue::Number {
                        value: index as f64,
                        format: "0".to_string(),
                    });
                }
                for column in self.schema.columns() {
                    cells.push(to_cell(&column.value(record), column.format.as_deref()));
                }
                writer.write_row(cells.iter())?;
            }
        }

        if let Some(current) = self.sheets.last_mut() {
            current.data_rows += 1;
        }
        self.next_index = index;
        Ok(())
    }

    fn finish(self) -> Result<ExportSummary> {
        match self.backend {
            Backend::Sheet {
                writer, mut sink, ..
            } => {
                writer.finish(&mut sink)?;
            }
            Backend::Delimited { mut writer } => {
                writer.finish()?;
            }
        }

        let summary = ExportSummary {
            rows: self.next_index,
            sheets: self.sheets,
        };
        tracing::info!(
            rows = summary.rows,
            sheets = summary.sheets.len(),
            "export finished"
        );
        Ok(summary)
    }
}

fn header_texts<T>(schema: &Schema<T>) -> Vec<String> {
    let mut headers = Vec::with_capacity(schema.columns().len() + 1);
    if schema.sheet.include_index {
        headers.push(schema.sheet.index_header.clone());
    }
    headers.extend(schema.headers().map(str::to_string));
    headers
}

fn open_sheet<T>(
    schema: &Schema<T>,
    writer: &mut StreamingSheetWriter,
    overflow: &mut OverflowController,
    name: String,
) -> Result<()> {
    let mut widths = Vec::with_capacity(schema.columns().len() + 1);
    if schema.sheet.include_index {
        widths.push(schema.sheet.index_width);
    }
    widths.extend(schema.columns().iter().map(|column| column.width));

    writer.open_sheet(SheetPlan {
        name,
        freeze_header: schema.sheet.freeze_header,
        column_widths: widths,
    });

    let index_header_style = CellStyleSpec::header_default();
    let mut cells: Vec<(CellValue, &CellStyleSpec)> =
        Vec::with_capacity(schema.columns().len() + 1);
    if schema.sheet.include_index {
        cells.push((
            CellValue::Text(schema.sheet.index_header.clone()),
            &index_header_style,
        ));
    }
    for column in schema.columns() {
        cells.push((CellValue::Text(column.header.clone()), &column.header_style));
    }
    writer.write_row(cells)?;
    overflow.on_header();
    Ok(())
}

fn validate_schema<T>(schema: &Schema<T>) -> Result<()> {
    if schema.sheet.name.trim().is_empty() {
        return Err(ExportError::Config(
            "sheet name must not be empty".to_string(),
        ));
    }
    for column in schema.columns() {
        if column.header.trim().is_empty() {
            return Err(ExportError::Config(
                "column header must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}
