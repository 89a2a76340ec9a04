//! Projection of flat records onto an output schema.

use indexmap::IndexMap;
use serde::Serialize;

use super::types::{Cardinality, OutputSchema};
use crate::config::LIST_DELIMITER;
use crate::node::{FieldValue, FlatRecord};

/// One output row: every schema column, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    values: IndexMap<String, Option<FieldValue>>,
}

impl Record {
    /// Value of a column; `None` for absent values and unknown columns.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values.get(column).and_then(Option::as_ref)
    }

    /// Whether the record has the column, with or without a value.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Number of columns, with or without a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Drop a column.
    pub fn remove_column(&mut self, column: &str) -> Option<Option<FieldValue>> {
        self.values.shift_remove(column)
    }

    /// Present values as a flat record.
    #[must_use]
    pub fn to_flat_record(&self) -> FlatRecord {
        self.values
            .iter()
            .filter_map(|(k, v)| v.clone().map(|v| (k.clone(), v)))
            .collect()
    }

    fn insert(&mut self, column: &str, value: Option<FieldValue>) {
        self.values.insert(column.to_string(), value);
    }
}

/// Coerce a value to the declared cardinality.
///
/// # Examples
/// ```
/// use ted_extractor::node::FieldValue;
/// use ted_extractor::schema::{coerce, Cardinality};
///
/// let list = FieldValue::List(vec!["45".into(), "71".into()]);
/// assert_eq!(coerce(list, Cardinality::Scalar), FieldValue::Scalar("45;71".into()));
/// ```
#[must_use]
pub fn coerce(value: FieldValue, cardinality: Cardinality) -> FieldValue {
    match (cardinality, value) {
        (Cardinality::List, value) => FieldValue::List(value.into_list()),
        (Cardinality::Scalar, FieldValue::List(items)) => {
            FieldValue::Scalar(items.join(LIST_DELIMITER))
        }
        (Cardinality::Scalar, value) => value,
    }
}

/// Project a record onto the schema.
///
/// The result has exactly [`OutputSchema::len`] columns. Fields missing from
/// the input are present with no value; input fields not in the schema are
/// ignored. Derived columns take the first element of their source field.
pub fn conform(record: &FlatRecord, schema: &OutputSchema) -> Record {
    let mut output = Record::default();

    for field in &schema.fields {
        let value = record
            .get(&field.name)
            .cloned()
            .map(|v| coerce(v, field.cardinality));
        output.insert(&field.name, value);
    }

    for derived in &schema.derived {
        let main = output
            .get(&derived.source)
            .and_then(FieldValue::first)
            .map(|first| FieldValue::Scalar(first.to_string()));
        output.insert(&derived.name, main);
    }

    output
}
