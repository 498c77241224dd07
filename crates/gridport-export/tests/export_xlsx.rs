//! Integration tests for spreadsheet export: sheet overflow, abort
//! policy, and the reserved CSV fallback.

use gridport_export::{
    ExportError, ExportOptions, ExportSummary, export, export_chunks,
};
use gridport_model::{
    ColumnMeta, Exportable, FieldValue, OverflowStrategy, Schema, SheetMeta,
};

struct Subject {
    id: i64,
    name: String,
}

impl Exportable for Subject {
    fn schema() -> Schema<Self> {
        Schema::new(
            SheetMeta::new("Subjects").with_index("No."),
            vec![
                ColumnMeta::new("ID", |s: &Subject| s.id.into()).with_order(1),
                ColumnMeta::new("Name", |s: &Subject| s.name.as_str().into()).with_order(2),
            ],
        )
    }
}

fn subjects(count: usize) -> Vec<Subject> {
    (1..=count)
        .map(|idx| Subject {
            id: idx as i64,
            name: format!("subject {idx}"),
        })
        .collect()
}

fn sheet_names(summary: &ExportSummary) -> Vec<&str> {
    summary
        .sheets
        .iter()
        .map(|sheet| sheet.name.as_str())
        .collect()
}

#[test]
fn single_sheet_under_the_limit() {
    let options = ExportOptions::default().with_max_rows_per_sheet(10);
    let mut out = Vec::new();
    let summary = export(&subjects(9), &mut out, &options).unwrap();

    assert_eq!(summary.rows, 9);
    assert_eq!(sheet_names(&summary), vec!["Subjects"]);
    assert_eq!(summary.sheets[0].data_rows, 9);
    // Zip container signature.
    assert_eq!(&out[..4], b"PK\x03\x04");
}

#[test]
fn overflow_splits_into_numbered_sheets() {
    // Limit 10 counts physical rows per sheet, header included: nine
    // data rows fit on each sheet.
    let options = ExportOptions::default().with_max_rows_per_sheet(10);
    let mut out = Vec::new();
    let summary = export(&subjects(25), &mut out, &options).unwrap();

    assert_eq!(summary.rows, 25);
    assert_eq!(
        sheet_names(&summary),
        vec!["Subjects", "Subjects (2)", "Subjects (3)"]
    );
    let data_rows: Vec<u32> = summary.sheets.iter().map(|sheet| sheet.data_rows).collect();
    assert_eq!(data_rows, vec![9, 9, 7]);
    assert_eq!(&out[..4], b"PK\x03\x04");
}

#[test]
fn chunked_export_splits_sheets_identically() {
    let options = ExportOptions::default().with_max_rows_per_sheet(10);

    let mut whole = Vec::new();
    let whole_summary = export(&subjects(25), &mut whole, &options).unwrap();

    let mut chunked = Vec::new();
    let mut remaining = subjects(25);
    let chunks: Vec<Vec<Subject>> = {
        let mut out = Vec::new();
        while !remaining.is_empty() {
            let take = remaining.len().min(7);
            out.push(remaining.drain(..take).collect());
        }
        out
    };
    let chunked_summary = export_chunks(chunks.into_iter(), &mut chunked, &options).unwrap();

    assert_eq!(whole_summary, chunked_summary);
}

#[test]
fn export_with_no_records_writes_header_only() {
    let mut out = Vec::new();
    let summary = export(&subjects(0), &mut out, &ExportOptions::default()).unwrap();
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.sheets[0].data_rows, 0);
    assert_eq!(&out[..4], b"PK\x03\x04");
}

struct Capped {
    value: i64,
}

impl Exportable for Capped {
    fn schema() -> Schema<Self> {
        Schema::new(
            SheetMeta::new("Capped").with_overflow(OverflowStrategy::Abort),
            vec![ColumnMeta::new("Value", |c: &Capped| c.value.into())],
        )
    }
}

fn capped(count: usize) -> Vec<Capped> {
    (0..count).map(|idx| Capped { value: idx as i64 }).collect()
}

#[test]
fn abort_policy_accepts_up_to_the_limit() {
    let options = ExportOptions::default().with_max_rows_per_sheet(10);
    let mut out = Vec::new();
    let summary = export(&capped(10), &mut out, &options).unwrap();
    assert_eq!(summary.rows, 10);
}

#[test]
fn abort_policy_raises_past_the_limit() {
    let options = ExportOptions::default().with_max_rows_per_sheet(10);
    let mut out = Vec::new();
    let err = export(&capped(11), &mut out, &options).unwrap_err();
    assert!(matches!(err, ExportError::RowLimitExceeded { max_rows: 10 }));
}

struct Fallback;

impl Exportable for Fallback {
    fn schema() -> Schema<Self> {
        Schema::new(
            SheetMeta::new("Fallback").with_overflow(OverflowStrategy::CsvFallback),
            vec![ColumnMeta::new("X", |_: &Fallback| FieldValue::Null)],
        )
    }
}

#[test]
fn csv_fallback_fails_fast_before_writing() {
    let mut out = Vec::new();
    let err = export(&[Fallback], &mut out, &ExportOptions::default()).unwrap_err();
    assert!(matches!(err, ExportError::CsvFallbackUnimplemented));
    assert!(out.is_empty());
}

struct NoColumns;

impl Exportable for NoColumns {
    fn schema() -> Schema<Self> {
        Schema::new(SheetMeta::new("Empty"), Vec::new())
    }
}

#[test]
fn zero_column_type_produces_header_only_output() {
    let mut out = Vec::new();
    let summary = export(&[NoColumns, NoColumns], &mut out, &ExportOptions::default()).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(&out[..4], b"PK\x03\x04");
}

#[test]
fn tiny_window_still_produces_the_full_document() {
    let options = ExportOptions::default()
        .with_max_rows_per_sheet(50)
        .with_window_rows(3);
    let mut out = Vec::new();
    let summary = export(&subjects(200), &mut out, &options).unwrap();
    assert_eq!(summary.rows, 200);
    assert_eq!(summary.sheets.len(), 5);
    assert_eq!(&out[..4], b"PK\x03\x04");
}
