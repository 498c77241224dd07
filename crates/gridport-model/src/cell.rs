//! Conversion of field values to canonical cell representations.
//!
//! The conversion is pure and deterministic: a [`FieldValue`] plus an
//! optional column format string always maps to the same [`CellValue`].
//! Dates and times render as formatted text cells, not native date
//! serials; this keeps the writer format-agnostic at the cost of
//! spreadsheet-native date semantics.

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Default number format for integer values.
pub const FORMAT_INT: &str = "#,##0";
/// Default number format for floating-point values.
pub const FORMAT_FLOAT: &str = "#,##0.00";
/// Default pattern for calendar dates.
pub const PATTERN_DATE: &str = "yyyy-MM-dd";
/// Default pattern for date-times.
pub const PATTERN_DATETIME: &str = "yyyy-MM-dd HH:mm:ss";
/// Default pattern for times of day.
pub const PATTERN_TIME: &str = "HH:mm:ss";
/// Default pattern for zoned date-times (zone id appended in brackets).
pub const PATTERN_ZONED: &str = "yyyy-MM-dd'T'HH:mm:ssXXX";

/// Canonical cell representation.
///
/// Serializable because buffered rows outside the access window are
/// spilled to backing storage in this form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Empty cell.
    Blank,
    /// Text cell.
    Text(String),
    /// Numeric cell with its number format string.
    Number { value: f64, format: String },
    /// Symbolic name of an enumerated value.
    EnumName(String),
}

impl CellValue {
    /// Textual rendering used by the delimited writer.
    pub fn render_text(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Text(text) | CellValue::EnumName(text) => text.clone(),
            CellValue::Number { value, format } => render_number(*value, format),
        }
    }
}

/// Convert a field value plus an optional column format to a cell.
///
/// A non-blank explicit `format` overrides the per-type default: for
/// numbers it replaces the number-format string, for date/time kinds it
/// is interpreted as a date pattern.
pub fn to_cell(value: &FieldValue, format: Option<&str>) -> CellValue {
    let format = format.map(str::trim).filter(|fmt| !fmt.is_empty());
    match value {
        FieldValue::Null => CellValue::Blank,
        FieldValue::Text(text) => CellValue::Text(text.clone()),
        FieldValue::Bool(flag) => CellValue::Text(if *flag { "Y" } else { "N" }.to_string()),
        FieldValue::Int(num) => CellValue::Number {
            value: *num as f64,
            format: format.unwrap_or(FORMAT_INT).to_string(),
        },
        FieldValue::Float(num) => CellValue::Number {
            value: *num,
            format: format.unwrap_or(FORMAT_FLOAT).to_string(),
        },
        FieldValue::Date(date) => CellValue::Text(
            date.format(&chrono_pattern(format.unwrap_or(PATTERN_DATE)))
                .to_string(),
        ),
        FieldValue::DateTime(datetime) => CellValue::Text(
            datetime
                .format(&chrono_pattern(format.unwrap_or(PATTERN_DATETIME)))
                .to_string(),
        ),
        FieldValue::Time(time) => CellValue::Text(
            time.format(&chrono_pattern(format.unwrap_or(PATTERN_TIME)))
                .to_string(),
        ),
        FieldValue::Zoned { datetime, zone } => CellValue::Text(format!(
            "{}[{zone}]",
            datetime.format(&chrono_pattern(format.unwrap_or(PATTERN_ZONED)))
        )),
        FieldValue::Enum(name) => CellValue::EnumName((*name).to_string()),
    }
}

/// Render a number under a number-format string.
///
/// Formats built from `# 0 , .` are honored: a `,` enables thousands
/// grouping and the `0`/`#` run after the `.` fixes the decimal places.
/// Anything else falls back to the plain `to_string` rendering.
pub fn render_number(value: f64, format: &str) -> String {
    let format = format.trim();
    if format.is_empty() || !format.chars().all(|ch| matches!(ch, '#' | '0' | ',' | '.')) {
        return render_plain(value);
    }

    let decimals = format
        .split_once('.')
        .map(|(_, frac)| frac.chars().take_while(|ch| matches!(ch, '0' | '#')).count())
        .unwrap_or(0);
    let grouped = format.contains(',');

    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), Some(frac_part.to_string())),
        None => (rendered, None),
    };

    let mut out = if grouped {
        group_thousands(&int_part)
    } else {
        int_part
    };
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }

    // Sign only when a significant digit survived the rounding.
    if value < 0.0 && out.chars().any(|ch| ('1'..='9').contains(&ch)) {
        out.insert(0, '-');
    }
    out
}

fn render_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let mut remaining = digits.len();
    for ch in digits.chars() {
        out.push(ch);
        remaining -= 1;
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

/// Translate a SimpleDateFormat-style pattern to a chrono format string.
///
/// Supported tokens: `yyyy yy MM dd HH mm ss SSS XXX` plus `'...'`
/// quoted literals (`''` is an escaped quote). Unknown letters pass
/// through literally.
pub fn chrono_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut idx = 0;

    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '\'' {
            idx += 1;
            while idx < chars.len() {
                if chars[idx] == '\'' {
                    if idx + 1 < chars.len() && chars[idx + 1] == '\'' {
                        push_literal(&mut out, '\'');
                        idx += 2;
                    } else {
                        idx += 1;
                        break;
                    }
                } else {
                    push_literal(&mut out, chars[idx]);
                    idx += 1;
                }
            }
            continue;
        }

        if ch.is_ascii_alphabetic() {
            let start = idx;
            while idx < chars.len() && chars[idx] == ch {
                idx += 1;
            }
            let run = idx - start;
            match ch {
                'y' if run >= 4 => out.push_str("%Y"),
                'y' => out.push_str("%y"),
                'M' => out.push_str("%m"),
                'd' => out.push_str("%d"),
                'H' => out.push_str("%H"),
                'm' => out.push_str("%M"),
                's' => out.push_str("%S"),
                'S' => out.push_str("%3f"),
                'X' => out.push_str("%:z"),
                _ => {
                    for _ in 0..run {
                        push_literal(&mut out, ch);
                    }
                }
            }
            continue;
        }

        push_literal(&mut out, ch);
        idx += 1;
    }

    out
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}
