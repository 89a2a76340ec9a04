//! Fixed output schema and projection of flat records onto it.
//!
//! The schema is configuration, not inferred from data: it lists every
//! output column with its [`Cardinality`], plus derived main-value columns,
//! legacy-path aliases and the columns used for euro conversion.

mod conform;
mod table;
mod types;

pub use conform::{coerce, conform, Record};
pub use table::{drop_empty_columns, Table};
pub use types::{Cardinality, CurrencyColumns, DerivedField, FieldAlias, FieldSpec, OutputSchema};
