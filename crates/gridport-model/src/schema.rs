//! Export schema model and the process-wide schema cache.
//!
//! Record types declare their column layout and sheet options explicitly
//! through the [`Exportable`] trait; [`SchemaCache`] memoizes the result
//! by type identity so extraction happens once per process.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use serde::{Deserialize, Serialize};

use crate::style::CellStyleSpec;
use crate::value::FieldValue;

/// Strategy applied when row count reaches the format's maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowStrategy {
    /// Continue on a new sheet named `"<base> (<n>)"`.
    #[default]
    MultiSheet,
    /// Abort the export with a row-limit-exceeded error.
    Abort,
    /// Reserved: redirect remaining output to the delimited writer.
    /// Not implemented; selecting it fails fast.
    CsvFallback,
}

/// Sheet-level options for an exported record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetMeta {
    /// Sheet name; must be non-empty.
    pub name: String,
    /// Freeze the header row.
    pub freeze_header: bool,
    /// Emit a 1-based logical row index as the first column.
    pub include_index: bool,
    /// Header text for the index column.
    pub index_header: String,
    /// Width of the index column in character units.
    pub index_width: u16,
    /// Overflow policy for this type.
    pub overflow: OverflowStrategy,
}

impl Default for SheetMeta {
    fn default() -> Self {
        Self {
            name: "Sheet1".to_string(),
            freeze_header: true,
            include_index: false,
            index_header: "No.".to_string(),
            index_width: 8,
            overflow: OverflowStrategy::default(),
        }
    }
}

impl SheetMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_frozen_header(mut self, freeze: bool) -> Self {
        self.freeze_header = freeze;
        self
    }

    pub fn with_index(mut self, header: impl Into<String>) -> Self {
        self.include_index = true;
        self.index_header = header.into();
        self
    }

    pub fn with_index_width(mut self, width: u16) -> Self {
        self.index_width = width;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowStrategy) -> Self {
        self.overflow = overflow;
        self
    }
}

/// One exportable column of a record type.
pub struct ColumnMeta<T> {
    /// Header text; must be non-empty.
    pub header: String,
    /// Sort key; need not be unique or contiguous. Ties keep
    /// declaration order.
    pub order: i32,
    /// Column width in character units.
    pub width: u16,
    /// Explicit format string overriding the per-type default.
    pub format: Option<String>,
    /// Field accessor.
    pub accessor: fn(&T) -> FieldValue,
    pub header_style: CellStyleSpec,
    pub body_style: CellStyleSpec,
}

impl<T> Clone for ColumnMeta<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            order: self.order,
            width: self.width,
            format: self.format.clone(),
            accessor: self.accessor,
            header_style: self.header_style.clone(),
            body_style: self.body_style.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ColumnMeta<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnMeta")
            .field("header", &self.header)
            .field("order", &self.order)
            .field("width", &self.width)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl<T> ColumnMeta<T> {
    pub fn new(header: impl Into<String>, accessor: fn(&T) -> FieldValue) -> Self {
        Self {
            header: header.into(),
            order: 0,
            width: 12,
            format: None,
            accessor,
            header_style: CellStyleSpec::header_default(),
            body_style: CellStyleSpec::default(),
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_header_style(mut self, style: CellStyleSpec) -> Self {
        self.header_style = style;
        self
    }

    pub fn with_body_style(mut self, style: CellStyleSpec) -> Self {
        self.body_style = style;
        self
    }

    /// Extract this column's value from a record.
    pub fn value(&self, record: &T) -> FieldValue {
        (self.accessor)(record)
    }
}

/// Ordered column schema plus sheet options for a record type.
#[derive(Debug, Clone)]
pub struct Schema<T> {
    pub sheet: SheetMeta,
    columns: Vec<ColumnMeta<T>>,
}

impl<T> Schema<T> {
    /// Build a schema. Columns are sorted ascending by `order` with a
    /// stable sort, so ties keep declaration order.
    pub fn new(sheet: SheetMeta, mut columns: Vec<ColumnMeta<T>>) -> Self {
        columns.sort_by_key(|column| column.order);
        Self { sheet, columns }
    }

    pub fn columns(&self) -> &[ColumnMeta<T>] {
        &self.columns
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.header.as_str())
    }
}

/// A record type that can be exported.
///
/// This is the explicit replacement for annotation introspection: the
/// schema is declared once in code and cached by type identity. A type
/// with zero columns is valid and produces header-only output.
pub trait Exportable: Sized + 'static {
    fn schema() -> Schema<Self>;
}

static CACHE: LazyLock<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Process-wide, read-mostly schema cache.
///
/// First population may race across threads; losers discard their copy
/// and adopt the cached one, so repeat lookups always return the same
/// `Arc`.
pub struct SchemaCache;

impl SchemaCache {
    /// Return the memoized schema for `T`, extracting it on first use.
    pub fn schema_of<T: Exportable>() -> Arc<Schema<T>> {
        let type_id = TypeId::of::<T>();

        {
            let cache = CACHE.read().unwrap_or_else(|err| err.into_inner());
            if let Some(entry) = cache.get(&type_id)
                && let Ok(schema) = entry.clone().downcast::<Schema<T>>()
            {
                return schema;
            }
        }

        let schema = Arc::new(T::schema());
        tracing::debug!(
            record_type = std::any::type_name::<T>(),
            columns = schema.columns().len(),
            sheet = %schema.sheet.name,
            "extracted export schema"
        );

        let mut cache = CACHE.write().unwrap_or_else(|err| err.into_inner());
        let entry = cache
            .entry(type_id)
            .or_insert_with(|| schema.clone() as Arc<dyn Any + Send + Sync>);
        entry
            .clone()
            .downcast::<Schema<T>>()
            .unwrap_or_else(|_| schema)
    }

    /// Drop all cached schemas. Intended for test isolation.
    pub fn clear() {
        CACHE
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .clear();
    }
}
