//! Per-language form selection.
//!
//! A notice's `FORM_SECTION` holds one entry per form type. Each entry is
//! either a single form body or a list of bodies, one per language, each
//! tagged with an `@LG` attribute.

use crate::error::{ExtractorError, Result};
use crate::node::{DocumentNode, FlatRecord};

/// Attribute carrying the language of a form body.
pub const LANGUAGE_ATTRIBUTE: &str = "@LG";

/// One language-specific form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInstance {
    /// Name of the form group (the key under `FORM_SECTION`).
    pub form: String,
    /// Value of the `@LG` attribute, if present.
    pub language: Option<String>,
    /// The form body subtree.
    pub body: DocumentNode,
}

impl FormInstance {
    /// Wrap a form body, reading its language attribute.
    #[must_use]
    pub fn new(form: impl Into<String>, body: DocumentNode) -> Self {
        let language = body
            .get(LANGUAGE_ATTRIBUTE)
            .and_then(DocumentNode::as_scalar)
            .map(str::to_string);
        Self {
            form: form.into(),
            language,
            body,
        }
    }
}

/// The bodies of one form group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormGroup {
    /// Only one language version exists; its body is a mapping.
    Single(FormInstance),
    /// One body per available language.
    Multiple(Vec<FormInstance>),
}

impl FormGroup {
    /// Build a form group from the subtree stored under `form`.
    ///
    /// # Errors
    /// Returns `StructuralAnomaly` when the subtree is a bare scalar.
    pub fn from_node(form: &str, node: &DocumentNode) -> Result<Self> {
        match node {
            DocumentNode::Mapping(_) => Ok(Self::Single(FormInstance::new(form, node.clone()))),
            DocumentNode::Sequence(items) => Ok(Self::Multiple(
                items
                    .iter()
                    .map(|item| FormInstance::new(form, item.clone()))
                    .collect(),
            )),
            DocumentNode::Scalar(_) => Err(ExtractorError::StructuralAnomaly {
                path: form.to_string(),
                expected: "mapping or sequence",
                found: node.kind(),
            }),
        }
    }

    /// Number of form bodies in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of selecting the forms of one group.
#[derive(Debug, Default)]
pub struct Selection {
    /// Selected bodies, each paired with its own copy of the notice header.
    pub pairs: Vec<(FlatRecord, FormInstance)>,
    /// Problems with individual form bodies that were skipped.
    pub warnings: Vec<String>,
}

/// Pair the header with the form bodies matching `language_filter`.
///
/// A single-body group is always selected, whatever its language, since no
/// other version of that notice exists. In a multi-body group only bodies
/// whose language equals the filter are selected; without a filter every
/// body is.
///
/// A malformed body in a list is skipped with a warning and does not affect
/// its siblings.
pub fn select(header: &FlatRecord, forms: &FormGroup, language_filter: Option<&str>) -> Selection {
    let mut selection = Selection::default();

    match forms {
        FormGroup::Single(instance) => {
            selection.pairs.push((header.clone(), instance.clone()));
        }
        FormGroup::Multiple(instances) => {
            for (index, instance) in instances.iter().enumerate() {
                match matches_filter(instance, language_filter) {
                    Ok(true) => selection.pairs.push((header.clone(), instance.clone())),
                    Ok(false) => {
                        tracing::debug!(
                            form = %instance.form,
                            index,
                            language = ?instance.language,
                            "Form language not selected"
                        );
                    }
                    Err(e) => {
                        let warning = format!("Form {}[{index}] skipped: {e}", instance.form);
                        tracing::warn!(form = %instance.form, index, error = %e, "Skipping form body");
                        selection.warnings.push(warning);
                    }
                }
            }
        }
    }

    selection
}

fn matches_filter(instance: &FormInstance, language_filter: Option<&str>) -> Result<bool> {
    if instance.body.as_mapping().is_none() {
        return Err(ExtractorError::StructuralAnomaly {
            path: instance.form.clone(),
            expected: "mapping",
            found: instance.body.kind(),
        });
    }

    let Some(filter) = language_filter else {
        return Ok(true);
    };

    match &instance.language {
        Some(language) => Ok(language == filter),
        None => Err(ExtractorError::MissingSection {
            section: LANGUAGE_ATTRIBUTE.to_string(),
            context: instance.form.clone(),
        }),
    }
}
