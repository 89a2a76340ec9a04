//! Flattening engine that walks a document tree using the key rules.

use super::config::create_notice_rules;
use super::rules::{clean_key, KeyRule, KeyRules};
use crate::config::PATH_SEPARATOR;
use crate::node::{DocumentNode, FlatRecord};

/// Engine that turns document subtrees into flat field paths.
///
/// The engine holds no per-document state: every call writes into the
/// record passed by the caller, so header and body subtrees of one notice
/// can be merged into the same record by calling [`Flattener::flatten`]
/// repeatedly.
#[derive(Debug, Clone)]
pub struct Flattener {
    rules: KeyRules,
    separator: String,
}

impl Flattener {
    /// Create a new engine with the given rules.
    #[must_use]
    pub fn new(rules: KeyRules) -> Self {
        Self {
            rules,
            separator: PATH_SEPARATOR.to_string(),
        }
    }

    /// Use a different path separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Flatten a subtree into a fresh record.
    #[must_use]
    pub fn flatten_new(&self, node: &DocumentNode) -> FlatRecord {
        let mut record = FlatRecord::new();
        self.flatten(node, "", &mut record);
        record
    }

    /// Flatten a subtree into `record`.
    ///
    /// # Arguments
    /// * `node` - Subtree to flatten
    /// * `parent_path` - Path of the element owning `node` (empty at the top)
    /// * `record` - Accumulator shared by all subtrees of one notice
    pub fn flatten(&self, node: &DocumentNode, parent_path: &str, record: &mut FlatRecord) {
        match node {
            DocumentNode::Mapping(map) => {
                for (key, value) in map {
                    self.flatten_entry(key, value, parent_path, record);
                }
            }
            DocumentNode::Scalar(text) if !parent_path.is_empty() => {
                record.accumulate(parent_path, text.as_str());
            }
            other => {
                tracing::debug!(
                    path = %parent_path,
                    kind = other.kind(),
                    "Subtree has no mapping keys to flatten, skipping"
                );
            }
        }
    }

    fn flatten_entry(
        &self,
        raw_key: &str,
        value: &DocumentNode,
        parent_path: &str,
        record: &mut FlatRecord,
    ) {
        let key = clean_key(raw_key);
        if key.is_empty() {
            tracing::debug!(path = %parent_path, key = %raw_key, "Empty key, skipping");
            return;
        }

        let rule = self.rules.rule_for(key);
        if rule == KeyRule::Drop {
            return;
        }

        let path = self.child_path(parent_path, key, rule);
        let paragraph = rule == KeyRule::ParagraphAppend;

        // Paragraph content lands on the enclosing element. At the top level
        // there is none, so it keeps its own name.
        let target = if paragraph && !parent_path.is_empty() {
            parent_path
        } else {
            path.as_str()
        };

        match value {
            DocumentNode::Scalar(text) => {
                record.accumulate(target, text.as_str());
            }
            DocumentNode::Sequence(items) => {
                let mut scalars = Vec::new();
                for item in items {
                    match item {
                        DocumentNode::Scalar(text) => scalars.push(text.clone()),
                        DocumentNode::Mapping(_) if paragraph => match item.text() {
                            Some(text) => {
                                scalars.push(text.to_string());
                                self.flatten_paragraph_children(item, target, record);
                            }
                            None => self.flatten(item, &path, record),
                        },
                        DocumentNode::Mapping(_) => self.flatten(item, &path, record),
                        DocumentNode::Sequence(_) => {
                            tracing::debug!(path = %path, "Nested sequence item, skipping");
                        }
                    }
                }
                record.accumulate_all(target, scalars);
            }
            DocumentNode::Mapping(_) => match item_paragraph_text(value, paragraph) {
                Some(text) => {
                    record.accumulate(target, text);
                    self.flatten_paragraph_children(value, target, record);
                }
                None => self.flatten(value, &path, record),
            },
        }
    }

    /// Flatten the elements inside a paragraph whose text was already
    /// merged, so they hang off the same path as that text.
    fn flatten_paragraph_children(
        &self,
        paragraph: &DocumentNode,
        target: &str,
        record: &mut FlatRecord,
    ) {
        let Some(map) = paragraph.as_mapping() else {
            return;
        };
        for (key, value) in map {
            if self.rules.rule_for(clean_key(key)) != KeyRule::TextMerge {
                self.flatten_entry(key, value, target, record);
            }
        }
    }

    fn child_path(&self, parent_path: &str, key: &str, rule: KeyRule) -> String {
        if parent_path.is_empty() {
            key.to_string()
        } else if rule == KeyRule::TextMerge {
            parent_path.to_string()
        } else {
            format!("{parent_path}{}{key}", self.separator)
        }
    }
}

impl Default for Flattener {
    /// Engine with the TED notice rules.
    fn default() -> Self {
        Self::new(create_notice_rules())
    }
}

/// Text of a paragraph mapping, which replaces descending into it.
fn item_paragraph_text(value: &DocumentNode, paragraph: bool) -> Option<&str> {
    if paragraph {
        value.text()
    } else {
        None
    }
}
