//! Field values extracted from records before cell conversion.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// A single value pulled out of a record by a column accessor.
///
/// This is the closed set of source types the converter has dedicated
/// rules for. Anything else degrades to its `Display` text via
/// [`FieldValue::other`] rather than failing the export.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent value; renders as a blank cell.
    Null,
    /// Plain text.
    Text(String),
    /// Boolean; renders as "Y" / "N".
    Bool(bool),
    /// Integer (any width up to 64-bit).
    Int(i64),
    /// Floating-point or decimal value.
    Float(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with time of day, no zone.
    DateTime(NaiveDateTime),
    /// Time of day.
    Time(NaiveTime),
    /// Date-time with a fixed offset and a named zone.
    Zoned {
        datetime: DateTime<FixedOffset>,
        zone: String,
    },
    /// Enumerated value; renders as its symbolic name, never an ordinal.
    Enum(&'static str),
}

impl FieldValue {
    /// Best-effort fallback for values without a dedicated conversion rule.
    pub fn other(value: impl Display) -> Self {
        FieldValue::Text(value.to_string())
    }

    /// Build a zoned date-time value.
    pub fn zoned(datetime: DateTime<FixedOffset>, zone: impl Into<String>) -> Self {
        FieldValue::Zoned {
            datetime,
            zone: zone.into(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i16> for FieldValue {
    fn from(value: i16) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(f64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(value: NaiveTime) -> Self {
        FieldValue::Time(value)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => FieldValue::Null,
        }
    }
}
