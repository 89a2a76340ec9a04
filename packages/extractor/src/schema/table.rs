//! Batch of conformed records.

use super::conform::Record;
use super::types::OutputSchema;

/// Conformed records of one batch plus what went wrong on the way.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column names, in output order.
    pub columns: Vec<String>,
    /// One record per selected notice form.
    pub rows: Vec<Record>,
    /// Recovered problems, one line each.
    pub warnings: Vec<String>,
    /// Number of notice documents read.
    pub documents: usize,
    /// Documents left out by the document-type filter.
    pub skipped: usize,
    /// Columns removed because no record had a value for them.
    pub dropped_columns: Vec<String>,
}

impl Table {
    /// Create an empty table with the schema's columns.
    #[must_use]
    pub fn new(schema: &OutputSchema) -> Self {
        Self {
            columns: schema.columns().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append the rows, warnings and counters of another table.
    pub fn extend(&mut self, other: Table) {
        self.rows.extend(other.rows);
        self.warnings.extend(other.warnings);
        self.documents += other.documents;
        self.skipped += other.skipped;
    }
}

/// Remove every column that has no value in any row.
///
/// A table without rows keeps its columns. Returns the removed names, which
/// are also added to [`Table::dropped_columns`].
pub fn drop_empty_columns(table: &mut Table) -> Vec<String> {
    if table.rows.is_empty() {
        return Vec::new();
    }

    let (kept, dropped): (Vec<String>, Vec<String>) = std::mem::take(&mut table.columns)
        .into_iter()
        .partition(|column| table.rows.iter().any(|row| row.get(column).is_some()));

    for row in &mut table.rows {
        for column in &dropped {
            row.remove_column(column);
        }
    }

    if !dropped.is_empty() {
        tracing::debug!(count = dropped.len(), "Dropped columns without values");
    }

    table.columns = kept;
    table.dropped_columns.extend(dropped.iter().cloned());
    dropped
}
