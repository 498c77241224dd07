//! Declarative schema model for tabular export.
//!
//! Record types describe their column layout once through the
//! [`Exportable`] trait; the model converts typed field values to
//! canonical cell representations and memoizes schemas by type
//! identity.
//!
//! # Example
//!
//! ```
//! use gridport_model::{
//!     CellStyleSpec, ColumnMeta, Exportable, FieldValue, Schema, SchemaCache, SheetMeta,
//! };
//!
//! struct Order {
//!     id: i64,
//!     total: f64,
//! }
//!
//! impl Exportable for Order {
//!     fn schema() -> Schema<Self> {
//!         Schema::new(
//!             SheetMeta::new("Orders").with_index("No."),
//!             vec![
//!                 ColumnMeta::new("Order ID", |o: &Order| o.id.into()).with_order(1),
//!                 ColumnMeta::new("Total", |o: &Order| o.total.into())
//!                     .with_order(2)
//!                     .with_format("#,##0.00"),
//!             ],
//!         )
//!     }
//! }
//!
//! let schema = SchemaCache::schema_of::<Order>();
//! assert_eq!(schema.columns().len(), 2);
//! ```

pub mod cell;
pub mod schema;
pub mod style;
pub mod value;

pub use cell::{CellValue, chrono_pattern, render_number, to_cell};
pub use schema::{ColumnMeta, Exportable, OverflowStrategy, Schema, SchemaCache, SheetMeta};
pub use style::{Alignment, CellStyleSpec};
pub use value::FieldValue;
