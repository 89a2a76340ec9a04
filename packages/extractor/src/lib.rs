//! TED Extractor - Flatten TED procurement notices into fixed-schema records.
//!
//! This crate turns notice XML from the daily TED packages into flat
//! records with a fixed, ordered set of columns, ready for columnar storage.
//!
//! # Example
//!
//! ```
//! use ted_extractor::flatten::Flattener;
//! use ted_extractor::node::FieldValue;
//! use ted_extractor::xml::parse_document;
//!
//! let doc = parse_document(r#"<CPV_MAIN CODE="45">Construction</CPV_MAIN>"#).unwrap();
//! let record = Flattener::default().flatten_new(&doc);
//!
//! assert_eq!(record.get("CPV_MAIN__CODE"), Some(&FieldValue::Scalar("45".into())));
//! assert_eq!(record.get("CPV_MAIN"), Some(&FieldValue::Scalar("Construction".into())));
//! ```
//!
//! # Architecture
//!
//! The extractor is organized into several modules:
//!
//! - [`config`]: Configuration constants and validation
//! - [`node`]: Document tree and flat record types
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML to document tree conversion
//! - [`flatten`]: Rule-driven key-path flattening
//! - [`forms`]: Per-language form selection
//! - [`notice`]: Notice header assembly and document-type filter
//! - [`currency`]: Exchange rates and euro conversion
//! - [`http`]: HTTP client for the rate endpoint
//! - [`schema`]: Output schema and record conformance
//! - [`output`]: JSON Lines output
//! - [`cli`]: Command-line interface
//! - [`pipeline`]: Batch pipeline

pub mod cli;
pub mod config;
pub mod currency;
pub mod error;
pub mod flatten;
pub mod forms;
pub mod http;
pub mod node;
pub mod notice;
pub mod output;
pub mod pipeline;
pub mod schema;
pub mod xml;

// Re-export the batch entry point
pub use pipeline::Pipeline;

// Re-export commonly used items
pub use config::{parse_batch_date, validate_language};
pub use error::{ExtractorError, Result};
pub use node::{DocumentNode, FieldValue, FlatRecord};
pub use schema::{Cardinality, OutputSchema, Record, Table};
