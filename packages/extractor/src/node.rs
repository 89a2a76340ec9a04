//! Core data types for the extractor.
//!
//! A notice file is first turned into a [`DocumentNode`] tree, then
//! flattened into a [`FlatRecord`] whose values are [`FieldValue`]s.

use indexmap::IndexMap;
use serde::Serialize;

/// One node of a parsed notice document.
///
/// Mapping keys are element names, attribute names prefixed with `@`, or
/// `#text` for the text content of an element that also has attributes or
/// children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNode {
    /// Ordered element body with unique keys.
    Mapping(IndexMap<String, DocumentNode>),
    /// Repeated sibling elements sharing one name, in document order.
    Sequence(Vec<DocumentNode>),
    /// Text-only element or attribute value.
    Scalar(String),
}

impl DocumentNode {
    /// Create a scalar node.
    #[must_use]
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Create a mapping node from key/value pairs, keeping their order.
    ///
    /// A repeated key replaces the earlier value in place.
    #[must_use]
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, DocumentNode)>) -> Self {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create a sequence node.
    #[must_use]
    pub fn sequence(items: impl IntoIterator<Item = DocumentNode>) -> Self {
        Self::Sequence(items.into_iter().collect())
    }

    /// Short name of the node kind, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "mapping",
            Self::Sequence(_) => "sequence",
            Self::Scalar(_) => "scalar",
        }
    }

    /// Look up a direct child of a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DocumentNode> {
        match self {
            Self::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Borrow the entries of a mapping.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&IndexMap<String, DocumentNode>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the value of a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Text content of an element: the scalar itself or a mapping's `#text`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Mapping(map) => map.get("#text").and_then(DocumentNode::as_scalar),
            Self::Sequence(_) => None,
        }
    }

    /// Remove a direct child of a mapping, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<DocumentNode> {
        match self {
            Self::Mapping(map) => map.shift_remove(key),
            _ => None,
        }
    }
}

/// Find a descendant following a slash-separated path of mapping keys.
///
/// # Examples
/// ```
/// use ted_extractor::node::{find_by_path, DocumentNode};
///
/// let doc = DocumentNode::mapping([(
///     "TED_EXPORT",
///     DocumentNode::mapping([("FORM_SECTION", DocumentNode::scalar("x"))]),
/// )]);
/// assert!(find_by_path(&doc, "TED_EXPORT/FORM_SECTION").is_some());
/// assert!(find_by_path(&doc, "TED_EXPORT/MISSING").is_none());
/// ```
#[must_use]
pub fn find_by_path<'a>(node: &'a DocumentNode, path: &str) -> Option<&'a DocumentNode> {
    path.split('/').try_fold(node, |current, part| current.get(part))
}

/// Value of one field of a flattened record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A single occurrence.
    Scalar(String),
    /// Repeated occurrences in document order.
    List(Vec<String>),
}

impl FieldValue {
    /// Add another occurrence, promoting a scalar to a two-element list.
    pub fn push(&mut self, value: impl Into<String>) {
        match self {
            Self::List(items) => items.push(value.into()),
            Self::Scalar(existing) => {
                let first = std::mem::take(existing);
                *self = Self::List(vec![first, value.into()]);
            }
        }
    }

    /// First occurrence, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(items) => items.first().map(String::as_str),
        }
    }

    /// Collapse into a single string.
    #[must_use]
    pub fn joined(&self, delimiter: &str) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => items.join(delimiter),
        }
    }

    /// Turn into a list, wrapping a scalar.
    #[must_use]
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s],
            Self::List(items) => items,
        }
    }
}

/// Flat mapping from field path to value, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: IndexMap<String, FieldValue>,
}

impl FlatRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.fields.get(path)
    }

    /// Whether the field path has a value.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    /// Number of distinct field paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(path, value)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field paths in first-seen order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, path: impl Into<String>, value: FieldValue) {
        self.fields.insert(path.into(), value);
    }

    /// Record one more occurrence of a field.
    ///
    /// An absent field becomes a scalar; a present one is promoted to a list
    /// (or extended if it already is one).
    pub fn accumulate(&mut self, path: &str, value: impl Into<String>) {
        match self.fields.get_mut(path) {
            Some(existing) => existing.push(value),
            None => {
                self.fields
                    .insert(path.to_string(), FieldValue::Scalar(value.into()));
            }
        }
    }

    /// Record a run of scalar occurrences gathered from one sequence.
    ///
    /// An absent field is set to the whole list; a present one accumulates
    /// each item in order.
    pub fn accumulate_all(&mut self, path: &str, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        match self.fields.get_mut(path) {
            Some(existing) => {
                for value in values {
                    existing.push(value);
                }
            }
            None => {
                self.fields.insert(path.to_string(), FieldValue::List(values));
            }
        }
    }

    /// Remove a field.
    pub fn remove(&mut self, path: &str) -> Option<FieldValue> {
        self.fields.shift_remove(path)
    }
}

impl FromIterator<(String, FieldValue)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_value_push_promotes_scalar() {
        let mut value = FieldValue::Scalar("A".to_string());
        value.push("B");
        value.push("C");
        assert_eq!(
            value,
            FieldValue::List(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
    }

    #[test]
    fn test_field_value_joined() {
        let value = FieldValue::List(vec!["45".to_string(), "71".to_string()]);
        assert_eq!(value.joined(";"), "45;71");
        assert_eq!(FieldValue::Scalar("45".to_string()).joined(";"), "45");
    }

    #[test]
    fn test_accumulate_three_occurrences_is_flat_list() {
        let mut record = FlatRecord::new();
        record.accumulate("X", "A");
        record.accumulate("X", "B");
        record.accumulate("X", "C");
        assert_eq!(
            record.get("X"),
            Some(&FieldValue::List(vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string()
            ]))
        );
    }

    #[test]
    fn test_accumulate_all_sets_when_absent() {
        let mut record = FlatRecord::new();
        record.accumulate_all("X", vec!["A".to_string()]);
        assert_eq!(record.get("X"), Some(&FieldValue::List(vec!["A".to_string()])));
    }

    #[test]
    fn test_accumulate_all_extends_when_present() {
        let mut record = FlatRecord::new();
        record.accumulate("X", "A");
        record.accumulate_all("X", vec!["B".to_string(), "C".to_string()]);
        assert_eq!(
            record.get("X"),
            Some(&FieldValue::List(vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string()
            ]))
        );
    }

    #[test]
    fn test_accumulate_all_ignores_empty() {
        let mut record = FlatRecord::new();
        record.accumulate_all("X", Vec::new());
        assert!(record.is_empty());
    }

    #[test]
    fn test_node_text() {
        let node = DocumentNode::mapping([
            ("@CODE", DocumentNode::scalar("45")),
            ("#text", DocumentNode::scalar("Construction")),
        ]);
        assert_eq!(node.text(), Some("Construction"));
        assert_eq!(DocumentNode::scalar("plain").text(), Some("plain"));
        assert_eq!(DocumentNode::sequence([]).text(), None);
    }

    #[test]
    fn test_node_remove_keeps_order() {
        let mut node = DocumentNode::mapping([
            ("A", DocumentNode::scalar("1")),
            ("URI_LIST", DocumentNode::scalar("2")),
            ("C", DocumentNode::scalar("3")),
        ]);
        assert!(node.remove("URI_LIST").is_some());
        let keys: Vec<_> = node.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["A".to_string(), "C".to_string()]);
    }
}
