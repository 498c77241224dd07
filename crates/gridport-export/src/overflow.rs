//! Row-limit tracking and overflow policy.
//!
//! One controller per export job. The multi-sheet policy counts
//! physical rows per sheet (header included) and rolls over to
//! `"<base> (<n>)"`; the abort policy counts data rows against the
//! limit and raises a structured error. The CSV fallback strategy is a
//! reserved extension point and is rejected before any row is written.

use gridport_model::OverflowStrategy;

use crate::error::{ExportError, Result};

/// Physical row ceiling of an xlsx sheet.
pub const EXCEL_MAX_ROWS: u32 = 1_048_576;

/// What to do with the next data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDisposition {
    /// Write it on the current sheet.
    Continue,
    /// Finalize the current sheet and continue on a new one with this
    /// name, re-emitting the header first.
    NewSheet(String),
}

/// Per-job overflow state machine.
#[derive(Debug)]
pub struct OverflowController {
    strategy: OverflowStrategy,
    max_rows_per_sheet: u32,
    base_name: String,
    rows_in_sheet: u32,
    data_rows: u64,
    sheet_seq: u32,
}

impl OverflowController {
    /// Build a controller; fails fast on the unimplemented strategy or
    /// a limit too small to hold a header and one data row.
    pub fn new(
        strategy: OverflowStrategy,
        max_rows_per_sheet: u32,
        base_name: impl Into<String>,
    ) -> Result<Self> {
        if strategy == OverflowStrategy::CsvFallback {
            return Err(ExportError::CsvFallbackUnimplemented);
        }
        if max_rows_per_sheet < 2 {
            return Err(ExportError::Config(format!(
                "max_rows_per_sheet must be at least 2, got {max_rows_per_sheet}"
            )));
        }
        Ok(Self {
            strategy,
            max_rows_per_sheet,
            base_name: base_name.into(),
            rows_in_sheet: 0,
            data_rows: 0,
            sheet_seq: 1,
        })
    }

    /// Decide the disposition of the next data row before writing it.
    pub fn before_row(&mut self) -> Result<RowDisposition> {
        match self.strategy {
            OverflowStrategy::Abort => {
                if self.data_rows >= u64::from(self.max_rows_per_sheet) {
                    return Err(ExportError::RowLimitExceeded {
                        max_rows: self.max_rows_per_sheet,
                    });
                }
                Ok(RowDisposition::Continue)
            }
            OverflowStrategy::MultiSheet => {
                if self.rows_in_sheet >= self.max_rows_per_sheet {
                    self.sheet_seq += 1;
                    self.rows_in_sheet = 0;
                    return Ok(RowDisposition::NewSheet(format!(
                        "{} ({})",
                        self.base_name, self.sheet_seq
                    )));
                }
                Ok(RowDisposition::Continue)
            }
            // Rejected in new().
            OverflowStrategy::CsvFallback => Err(ExportError::CsvFallbackUnimplemented),
        }
    }

    /// Record a written header row.
    pub fn on_header(&mut self) {
        self.rows_in_sheet += 1;
    }

    /// Record a written data row.
    pub fn on_row(&mut self) {
        self.rows_in_sheet += 1;
        self.data_rows += 1;
    }

    /// Data rows written so far across all sheets.
    pub fn data_rows(&self) -> u64 {
        self.data_rows
    }

    /// 1-based sequence number of the current sheet.
    pub fn sheet_seq(&self) -> u32 {
        self.sheet_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(controller: &mut OverflowController, rows: usize) -> Vec<String> {
        let mut rollovers = Vec::new();
        controller.on_header();
        for _ in 0..rows {
            match controller.before_row().unwrap() {
                RowDisposition::Continue => {}
                RowDisposition::NewSheet(name) => {
                    rollovers.push(name);
                    controller.on_header();
                }
            }
            controller.on_row();
        }
        rollovers
    }

    #[test]
    fn multi_sheet_rolls_over_after_nine_data_rows_at_limit_ten() {
        let mut controller =
            OverflowController::new(OverflowStrategy::MultiSheet, 10, "Report").unwrap();
        let rollovers = feed(&mut controller, 25);
        assert_eq!(rollovers, vec!["Report (2)", "Report (3)"]);
        assert_eq!(controller.data_rows(), 25);
        assert_eq!(controller.sheet_seq(), 3);
    }

    #[test]
    fn multi_sheet_stays_on_one_sheet_under_the_limit() {
        let mut controller =
            OverflowController::new(OverflowStrategy::MultiSheet, 10, "Report").unwrap();
        let rollovers = feed(&mut controller, 9);
        assert!(rollovers.is_empty());
    }

    #[test]
    fn abort_allows_exactly_the_limit() {
        let mut controller =
            OverflowController::new(OverflowStrategy::Abort, 10, "Report").unwrap();
        controller.on_header();
        for _ in 0..10 {
            assert_eq!(controller.before_row().unwrap(), RowDisposition::Continue);
            controller.on_row();
        }
        let err = controller.before_row().unwrap_err();
        assert!(matches!(
            err,
            ExportError::RowLimitExceeded { max_rows: 10 }
        ));
    }

    #[test]
    fn csv_fallback_is_rejected_up_front() {
        let err =
            OverflowController::new(OverflowStrategy::CsvFallback, 100, "Report").unwrap_err();
        assert!(matches!(err, ExportError::CsvFallbackUnimplemented));
    }

    #[test]
    fn tiny_limits_are_rejected() {
        let err = OverflowController::new(OverflowStrategy::MultiSheet, 1, "Report").unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
    }
}
