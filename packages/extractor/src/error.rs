//! Error types for the extractor.
//!
//! `ExtractorError` covers everything that can stop a call at the library
//! boundary. Most per-document and per-field problems never reach it: they
//! are logged where they happen and recorded as warnings on the batch
//! result instead.

use thiserror::Error;

/// Main error type for the extractor library.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// Invalid language code.
    #[error("Invalid language code: '{0}'. Expected two upper-case letters (e.g., EN)")]
    InvalidLanguage(String),

    /// Invalid currency code.
    #[error("Invalid currency code: '{0}'. Expected an ISO 4217 code (e.g., USD)")]
    InvalidCurrency(String),

    /// Invalid batch date prefix.
    #[error("Invalid batch date: '{0}'. Expected a YYYYMMDD prefix (e.g., 20190102_2019001)")]
    InvalidDate(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts exhausted.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// A mandatory section of a notice is absent.
    #[error("Missing required section: {section} in {context}")]
    MissingSection { section: String, context: String },

    /// A subtree does not have the expected shape.
    #[error("Unexpected structure at {path}: expected {expected}, found {found}")]
    StructuralAnomaly {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Value and currency columns differ in length.
    #[error("Currency input mismatch: {values} values but {currencies} currency codes")]
    CurrencyLengthMismatch { values: usize, currencies: usize },

    /// Output schema configuration is invalid.
    #[error("Invalid output schema: {0}")]
    InvalidSchema(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error.
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, ExtractorError>;
