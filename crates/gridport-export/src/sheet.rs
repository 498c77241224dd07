//! Streaming spreadsheet writer with a bounded access window.
//!
//! Only the most recent W rows stay resident; older rows are serialized
//! to an anonymous temp file and are immutable from then on, so peak
//! resident state is O(W x row width) regardless of dataset size.
//! Writing is append-only and forward-only. `finish` replays the
//! spilled rows and the window into the workbook encoder and streams
//! the finished document to the caller's sink; the backing file is
//! reclaimed by the OS on every exit path because it is anonymous.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};

use gridport_model::{CellStyleSpec, CellValue};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::style::{StyleCache, StyleId};

/// Default number of rows kept resident in the access window.
pub const DEFAULT_WINDOW_ROWS: usize = 200;

/// Sheet names longer than this are rejected by the container format.
const SHEET_NAME_MAX: usize = 31;

/// Layout of one sheet segment.
#[derive(Debug, Clone)]
pub struct SheetPlan {
    pub name: String,
    pub freeze_header: bool,
    /// Column widths in character units, leftmost first.
    pub column_widths: Vec<u16>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BufferedCell {
    value: CellValue,
    style: StyleId,
}

#[derive(Debug, Serialize, Deserialize)]
struct BufferedRow {
    sheet: usize,
    row: u32,
    cells: Vec<BufferedCell>,
}

struct Spill {
    writer: BufWriter<File>,
    rows: u64,
}

/// Append-only sheet writer over a bounded in-memory window.
pub struct StreamingSheetWriter {
    window_rows: usize,
    styles: StyleCache,
    sheets: Vec<SheetPlan>,
    window: VecDeque<BufferedRow>,
    spill: Option<Spill>,
    next_row: u32,
    rows_written: u64,
}

impl StreamingSheetWriter {
    pub fn new(window_rows: usize) -> Self {
        Self {
            window_rows: window_rows.max(1),
            styles: StyleCache::new(),
            sheets: Vec::new(),
            window: VecDeque::new(),
            spill: None,
            next_row: 0,
            rows_written: 0,
        }
    }

    /// Open a new sheet segment; subsequent rows land on it.
    pub fn open_sheet(&mut self, mut plan: SheetPlan) -> usize {
        if plan.name.chars().count() > SHEET_NAME_MAX {
            plan.name = plan.name.chars().take(SHEET_NAME_MAX).collect();
        }
        self.sheets.push(plan);
        self.next_row = 0;
        self.sheets.len() - 1
    }

    /// Append one row of styled cells to the current sheet.
    pub fn write_row<'a>(
        &mut self,
        cells: impl IntoIterator<Item = (CellValue, &'a CellStyleSpec)>,
    ) -> Result<()> {
        let Some(sheet) = self.sheets.len().checked_sub(1) else {
            return Err(ExportError::Config(
                "row written before any sheet was opened".to_string(),
            ));
        };

        let cells = cells
            .into_iter()
            .map(|(value, spec)| {
                let number_format = match &value {
                    CellValue::Number { format, .. } => format.as_str(),
                    _ => "",
                };
                BufferedCell {
                    style: self.styles.style_for(spec, number_format),
                    value,
                }
            })
            .collect();

        self.window.push_back(BufferedRow {
            sheet,
            row: self.next_row,
            cells,
        });
        self.next_row += 1;
        self.rows_written += 1;
        self.evict()
    }

    /// Total rows accepted so far (headers included).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Rows flushed out of the access window to backing storage.
    pub fn spilled_rows(&self) -> u64 {
        self.spill.as_ref().map_or(0, |spill| spill.rows)
    }

    /// Rows currently resident in the access window.
    pub fn resident_rows(&self) -> usize {
        self.window.len()
    }

    /// Distinct styles created so far.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Serialize the complete document to the sink and release the
    /// backing storage.
    pub fn finish<W: Write>(mut self, sink: &mut W) -> Result<u64> {
        let mut workbook = Workbook::new();
        for plan in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&plan.name)?;
            for (idx, width) in plan.column_widths.iter().enumerate() {
                worksheet.set_column_width(idx as u16, f64::from(*width))?;
            }
            if plan.freeze_header {
                worksheet.set_freeze_panes(1, 0)?;
            }
        }

        if let Some(spill) = self.spill.take() {
            let mut file = spill
                .writer
                .into_inner()
                .map_err(|err| ExportError::Io(err.into_error()))?;
            file.seek(SeekFrom::Start(0))?;
            for line in BufReader::new(file).lines() {
                let row: BufferedRow = serde_json::from_str(&line?)?;
                Self::replay_row(&mut workbook, &self.styles, &row)?;
            }
        }
        while let Some(row) = self.window.pop_front() {
            Self::replay_row(&mut workbook, &self.styles, &row)?;
        }

        let bytes = workbook.save_to_buffer()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(self.rows_written)
    }

    fn evict(&mut self) -> Result<()> {
        if self.window.len() <= self.window_rows {
            return Ok(());
        }

        if self.spill.is_none() {
            tracing::debug!(
                window = self.window_rows,
                "access window full; spilling rows to temp storage"
            );
            self.spill = Some(Spill {
                writer: BufWriter::new(tempfile::tempfile()?),
                rows: 0,
            });
        }

        if let Some(spill) = self.spill.as_mut() {
            while self.window.len() > self.window_rows {
                let Some(row) = self.window.pop_front() else {
                    break;
                };
                serde_json::to_writer(&mut spill.writer, &row)?;
                spill.writer.write_all(b"\n")?;
                spill.rows += 1;
            }
        }
        Ok(())
    }

    fn replay_row(workbook: &mut Workbook, styles: &StyleCache, row: &BufferedRow) -> Result<()> {
        let worksheet = workbook.worksheet_from_index(row.sheet)?;
        for (col, cell) in row.cells.iter().enumerate() {
            write_cell(worksheet, row.row, col as u16, cell, styles)?;
        }
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &BufferedCell,
    styles: &StyleCache,
) -> Result<()> {
    let format = styles.format(cell.style);
    match &cell.value {
        CellValue::Blank => {
            worksheet.write_blank(row, col, format)?;
        }
        CellValue::Text(text) | CellValue::EnumName(text) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        CellValue::Number { value, .. } => {
            worksheet.write_number_with_format(row, col, *value, format)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str) -> SheetPlan {
        SheetPlan {
            name: name.to_string(),
            freeze_header: true,
            column_widths: vec![10, 20],
        }
    }

    fn text_row(text: &str) -> Vec<(CellValue, &'static CellStyleSpec)> {
        static BODY: std::sync::LazyLock<CellStyleSpec> =
            std::sync::LazyLock::new(CellStyleSpec::default);
        vec![
            (CellValue::Text(text.to_string()), &*BODY),
            (
                CellValue::Number {
                    value: 1.0,
                    format: "#,##0".to_string(),
                },
                &*BODY,
            ),
        ]
    }

    #[test]
    fn rows_beyond_the_window_are_spilled() {
        let mut writer = StreamingSheetWriter::new(4);
        writer.open_sheet(plan("Data"));
        for idx in 0..20 {
            writer.write_row(text_row(&format!("row {idx}"))).unwrap();
        }

        assert_eq!(writer.rows_written(), 20);
        assert_eq!(writer.resident_rows(), 4);
        assert_eq!(writer.spilled_rows(), 16);

        let mut out = Vec::new();
        writer.finish(&mut out).unwrap();
        // Zip container signature.
        assert_eq!(&out[..4], b"PK\x03\x04");
    }

    #[test]
    fn small_exports_never_touch_backing_storage() {
        let mut writer = StreamingSheetWriter::new(100);
        writer.open_sheet(plan("Data"));
        for idx in 0..10 {
            writer.write_row(text_row(&format!("row {idx}"))).unwrap();
        }
        assert_eq!(writer.spilled_rows(), 0);
        assert_eq!(writer.resident_rows(), 10);
    }

    #[test]
    fn row_before_sheet_is_a_config_error() {
        let mut writer = StreamingSheetWriter::new(10);
        let err = writer.write_row(text_row("nope")).unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
    }

    #[test]
    fn long_sheet_names_are_truncated() {
        let mut writer = StreamingSheetWriter::new(10);
        writer.open_sheet(plan(&"x".repeat(40)));
        writer.write_row(text_row("a")).unwrap();
        let mut out = Vec::new();
        writer.finish(&mut out).unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn styles_are_deduplicated_across_rows() {
        let mut writer = StreamingSheetWriter::new(8);
        writer.open_sheet(plan("Data"));
        for idx in 0..50 {
            writer.write_row(text_row(&idx.to_string())).unwrap();
        }
        // Text cells share one style, number cells another.
        assert_eq!(writer.style_count(), 2);
    }
}
