//! Output schema definition and loading.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ExtractorError, Result};
use crate::node::FlatRecord;

/// Built-in schema for TED notices.
const TED_NOTICE_SCHEMA: &str = include_str!("../../schema/ted_notice.yaml");

/// Whether an output field holds one value or an ordered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cardinality {
    #[default]
    Scalar,
    List,
}

/// One declared output field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub cardinality: Cardinality,
}

/// A SCALAR column holding the first element of a LIST field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DerivedField {
    pub name: String,
    pub source: String,
}

/// Fallback from a legacy field path to its canonical path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldAlias {
    pub legacy: String,
    pub canonical: String,
}

/// Fields feeding the euro conversion and the column receiving its result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyColumns {
    pub value: String,
    pub currency: String,
    pub target: String,
}

/// Ordered output schema with per-field cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputSchema {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub derived: Vec<DerivedField>,
    #[serde(default)]
    pub aliases: Vec<FieldAlias>,
    #[serde(default)]
    pub currency: Option<CurrencyColumns>,
}

impl OutputSchema {
    /// Parse and validate a schema from YAML.
    ///
    /// # Errors
    /// Returns `Yaml` for malformed documents and `InvalidSchema` when names
    /// repeat or a derived, alias or currency entry refers to an unknown or
    /// wrongly typed field.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let schema: Self = serde_yaml_ng::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load a schema file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// The built-in TED notice schema.
    pub fn ted_notice() -> Result<Self> {
        Self::from_yaml(TED_NOTICE_SCHEMA)
    }

    /// Build a schema from `(name, cardinality)` pairs, without extras.
    pub fn from_fields<S: Into<String>>(
        fields: impl IntoIterator<Item = (S, Cardinality)>,
    ) -> Result<Self> {
        let schema = Self {
            name: None,
            version: None,
            fields: fields
                .into_iter()
                .map(|(name, cardinality)| FieldSpec {
                    name: name.into(),
                    cardinality,
                })
                .collect(),
            derived: Vec::new(),
            aliases: Vec::new(),
            currency: None,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Add a derived main-value column.
    pub fn with_derived(mut self, name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        self.derived.push(DerivedField {
            name: name.into(),
            source: source.into(),
        });
        self.validate()?;
        Ok(self)
    }

    /// Number of output columns, derived ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len() + self.derived.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Output column names in order: declared fields, then derived ones.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.derived.iter().map(|d| d.name.as_str()))
    }

    /// Cardinality of a declared field.
    #[must_use]
    pub fn cardinality(&self, name: &str) -> Option<Cardinality> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.cardinality)
    }

    /// Copy legacy field values to their canonical paths.
    ///
    /// A canonical path that already has a value is left alone.
    pub fn apply_aliases(&self, record: &mut FlatRecord) {
        for alias in &self.aliases {
            if record.contains(&alias.canonical) {
                continue;
            }
            if let Some(value) = record.get(&alias.legacy).cloned() {
                tracing::debug!(
                    legacy = %alias.legacy,
                    canonical = %alias.canonical,
                    "Using legacy field"
                );
                record.set(alias.canonical.clone(), value);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.columns() {
            if name.is_empty() {
                return Err(ExtractorError::InvalidSchema("empty field name".to_string()));
            }
            if !seen.insert(name) {
                return Err(ExtractorError::InvalidSchema(format!(
                    "duplicate field '{name}'"
                )));
            }
        }

        for derived in &self.derived {
            if self.cardinality(&derived.source).is_none() {
                return Err(ExtractorError::InvalidSchema(format!(
                    "derived field '{}' refers to unknown field '{}'",
                    derived.name, derived.source
                )));
            }
        }

        for alias in &self.aliases {
            if alias.legacy == alias.canonical {
                return Err(ExtractorError::InvalidSchema(format!(
                    "alias '{}' points to itself",
                    alias.legacy
                )));
            }
        }

        if let Some(currency) = &self.currency {
            if self.cardinality(&currency.target) != Some(Cardinality::Scalar) {
                return Err(ExtractorError::InvalidSchema(format!(
                    "currency target '{}' must be a declared SCALAR field",
                    currency.target
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::FieldValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ted_notice_schema_loads() {
        let schema = OutputSchema::ted_notice().unwrap();

        assert_eq!(schema.name.as_deref(), Some("ted_notice"));
        assert_eq!(schema.fields.len(), 122);
        assert_eq!(schema.derived.len(), 6);
        assert_eq!(schema.len(), 128);
        assert_eq!(schema.cardinality("DATE"), Some(Cardinality::Scalar));
        assert_eq!(schema.cardinality("ORIGINAL_CPV_CODE"), Some(Cardinality::List));
        assert_eq!(
            schema.cardinality("n2016:TENDERER_NUTS__CODE"),
            Some(Cardinality::List)
        );
        assert_eq!(schema.cardinality("VALUE_EUR"), Some(Cardinality::Scalar));
        assert_eq!(schema.columns().next(), Some("AA_AUTHORITY_TYPE"));
        assert_eq!(schema.columns().last(), Some(
            "MAIN_AWARD_CONTRACT__AWARDED_CONTRACT__CONTRACTORS__CONTRACTOR__ADDRESS_CONTRACTOR__COUNTRY__VALUE"
        ));
    }

    #[test]
    fn test_from_yaml_defaults_to_scalar() {
        let schema = OutputSchema::from_yaml(
            "fields:\n  - name: A\n  - name: B\n    cardinality: LIST\n",
        )
        .unwrap();

        assert_eq!(schema.cardinality("A"), Some(Cardinality::Scalar));
        assert_eq!(schema.cardinality("B"), Some(Cardinality::List));
        assert!(schema.derived.is_empty());
        assert!(schema.currency.is_none());
    }

    #[test]
    fn test_from_yaml_rejects_unknown_cardinality() {
        let result = OutputSchema::from_yaml("fields:\n  - name: A\n    cardinality: MAP\n");
        assert!(matches!(result, Err(ExtractorError::Yaml(_))));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = OutputSchema::from_fields([("A", Cardinality::Scalar), ("A", Cardinality::List)]);
        assert!(matches!(result, Err(ExtractorError::InvalidSchema(_))));
    }

    #[test]
    fn test_derived_with_unknown_source_rejected() {
        let schema = OutputSchema::from_fields([("A", Cardinality::List)]).unwrap();
        let result = schema.with_derived("MAIN_B", "B");
        assert!(matches!(result, Err(ExtractorError::InvalidSchema(_))));
    }

    #[test]
    fn test_currency_target_must_be_scalar_field() {
        let yaml = "fields:\n  - name: V\n  - name: C\n  - name: EUR\n    cardinality: LIST\n\
                    currency:\n  value: V\n  currency: C\n  target: EUR\n";
        let result = OutputSchema::from_yaml(yaml);
        assert!(matches!(result, Err(ExtractorError::InvalidSchema(_))));
    }

    #[test]
    fn test_apply_aliases_fills_missing_canonical() {
        let schema = OutputSchema::ted_notice().unwrap();
        let mut record = FlatRecord::new();
        record.accumulate("OBJECT_CONTRACT__VAL_TOTAL", "1000");
        record.accumulate("OBJECT_CONTRACT__VAL_TOTAL__CURRENCY", "GBP");

        schema.apply_aliases(&mut record);

        assert_eq!(
            record.get("VALUES__VALUE"),
            Some(&FieldValue::Scalar("1000".to_string()))
        );
        assert_eq!(
            record.get("VALUES__VALUE__CURRENCY"),
            Some(&FieldValue::Scalar("GBP".to_string()))
        );
        assert!(record.contains("OBJECT_CONTRACT__VAL_TOTAL"));
    }

    #[test]
    fn test_apply_aliases_keeps_existing_canonical() {
        let schema = OutputSchema::ted_notice().unwrap();
        let mut record = FlatRecord::new();
        record.accumulate("VALUES__VALUE", "5");
        record.accumulate("OBJECT_CONTRACT__VAL_TOTAL", "1000");

        schema.apply_aliases(&mut record);

        assert_eq!(
            record.get("VALUES__VALUE"),
            Some(&FieldValue::Scalar("5".to_string()))
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        std::fs::write(&path, "fields:\n  - name: A\n").unwrap();

        let schema = OutputSchema::from_file(&path).unwrap();
        assert_eq!(schema.len(), 1);
    }
}
