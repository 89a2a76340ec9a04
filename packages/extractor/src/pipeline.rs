//! Batch pipeline that ties all components together.
//!
//! For every notice: parse, filter by document type, build the header,
//! select forms, flatten each selected form on top of its header, convert
//! the contract value to euros and project onto the output schema.

use std::fs;
use std::path::Path;

use reqwest::blocking::Client;

use crate::config::{parse_batch_date, validate_language, DEFAULT_DOC_TYPES, DEFAULT_LANGUAGE};
use crate::currency::{convert_field, fetch_rates, ExchangeRateTable};
use crate::error::{ExtractorError, Result};
use crate::flatten::Flattener;
use crate::forms::FormInstance;
use crate::node::{FieldValue, FlatRecord};
use crate::notice::{accepts_document_type, Notice};
use crate::schema::{conform, drop_empty_columns, OutputSchema, Record, Table};
use crate::xml::parse_document;

/// Flattening pipeline for one batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    flattener: Flattener,
    schema: OutputSchema,
    language: Option<String>,
    doc_types: Option<Vec<String>>,
    rates: Option<ExchangeRateTable>,
    batch_warnings: Vec<String>,
}

impl Pipeline {
    /// Create a pipeline with the default language and document types and
    /// no currency conversion.
    #[must_use]
    pub fn new(schema: OutputSchema) -> Self {
        Self {
            flattener: Flattener::default(),
            schema,
            language: Some(DEFAULT_LANGUAGE.to_string()),
            doc_types: Some(DEFAULT_DOC_TYPES.iter().map(|t| t.to_string()).collect()),
            rates: None,
            batch_warnings: Vec::new(),
        }
    }

    /// Select forms in this language; `None` selects every language.
    ///
    /// # Errors
    /// Returns `InvalidLanguage` for codes that are not two upper-case letters.
    pub fn with_language(mut self, language: Option<String>) -> Result<Self> {
        if let Some(language) = &language {
            validate_language(language)?;
        }
        self.language = language;
        Ok(self)
    }

    /// Keep only these document types; `None` keeps every document.
    #[must_use]
    pub fn with_doc_types(mut self, doc_types: Option<Vec<String>>) -> Self {
        self.doc_types = doc_types;
        self
    }

    /// Convert values with this rate table.
    #[must_use]
    pub fn with_rates(mut self, rates: ExchangeRateTable) -> Self {
        self.rates = Some(rates);
        self
    }

    /// Fetch the rate table for this batch.
    ///
    /// A failed fetch disables currency conversion for the batch and is
    /// reported as a warning on the resulting table; every other column is
    /// still produced.
    #[must_use]
    pub fn with_rates_from(mut self, client: &Client, url: &str) -> Self {
        match fetch_rates(client, url) {
            Ok(rates) => self.rates = Some(rates),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Exchange rates unavailable, skipping currency conversion");
                self.batch_warnings
                    .push(format!("Currency conversion skipped: {e}"));
                self.rates = None;
            }
        }
        self
    }

    /// Rate table in use; `None` when conversion is disabled for the batch.
    #[must_use]
    pub fn rates(&self) -> Option<&ExchangeRateTable> {
        self.rates.as_ref()
    }

    /// Process one notice file.
    ///
    /// The returned table holds zero or more rows and counts the document
    /// as read (or skipped, when its type is filtered out). Columns are not
    /// pruned; that happens once per batch in [`Pipeline::run`].
    ///
    /// # Errors
    /// Returns an error when the XML cannot be parsed or has no
    /// `TED_EXPORT` root.
    pub fn process_document(&self, xml: &str, date: &str, file: &str) -> Result<Table> {
        let doc = parse_document(xml)?;
        let mut table = Table::new(&self.schema);
        table.documents = 1;

        if !accepts_document_type(&doc, self.doc_types.as_deref()) {
            tracing::debug!(file = %file, "Document type filtered out");
            table.skipped = 1;
            return Ok(table);
        }

        let notice = Notice::from_document_with(&self.flattener, &doc, date, file)?;
        table.warnings.extend(notice.warnings.iter().cloned());

        let selection = notice.select_forms(self.language.as_deref());
        table.warnings.extend(selection.warnings);

        for (header, form) in selection.pairs {
            table.rows.push(self.build_record(header, &form));
        }

        tracing::debug!(file = %file, records = table.len(), "Processed notice");
        Ok(table)
    }

    /// Process every daily package under `data_dir`.
    ///
    /// Each sub-directory named `<YYYYMMDD>_<suffix>` contributes its
    /// `*.xml` files, dated by the prefix. Unreadable entries and failing
    /// documents are logged, recorded as warnings and skipped. Columns with
    /// no value in any row are dropped at the end.
    ///
    /// # Errors
    /// Returns an error only when `data_dir` itself cannot be read.
    pub fn run(&self, data_dir: &Path) -> Result<Table> {
        let mut table = Table::new(&self.schema);
        table.warnings.extend(self.batch_warnings.iter().cloned());

        let mut packages: Vec<_> = fs::read_dir(data_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        packages.sort();

        for package in packages {
            let name = file_name(&package);
            let date = match parse_batch_date(&name) {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!(dir = %name, error = %e, "Skipping directory");
                    table.warnings.push(format!("{name}: {e}"));
                    continue;
                }
            };
            self.run_package(&package, &date, &mut table);
        }

        let dropped = drop_empty_columns(&mut table);
        tracing::info!(
            documents = table.documents,
            skipped = table.skipped,
            records = table.len(),
            warnings = table.warnings.len(),
            dropped_columns = dropped.len(),
            "Batch complete"
        );

        Ok(table)
    }

    fn run_package(&self, package: &Path, date: &str, table: &mut Table) {
        let entries = match fs::read_dir(package) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %package.display(), error = %e, "Cannot read package");
                table.warnings.push(format!("{}: {e}", package.display()));
                return;
            }
        };

        let mut files: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_xml(path))
            .collect();
        files.sort();

        for path in files {
            let file = file_name(&path);
            let result = fs::read_to_string(&path)
                .map_err(ExtractorError::from)
                .and_then(|xml| self.process_document(&xml, date, &file));

            match result {
                Ok(document) => table.extend(document),
                Err(e) => {
                    tracing::warn!(file = %file, error = %e, "Skipping document");
                    table.documents += 1;
                    table.warnings.push(format!("{file}: {e}"));
                }
            }
        }
    }

    fn build_record(&self, mut record: FlatRecord, form: &FormInstance) -> Record {
        self.flattener.flatten(&form.body, "", &mut record);
        self.schema.apply_aliases(&mut record);

        if let (Some(columns), Some(rates)) = (&self.schema.currency, &self.rates) {
            let amount = convert_field(
                record.get(&columns.value),
                record.get(&columns.currency),
                rates,
            );
            if let Some(amount) = amount {
                record.set(columns.target.clone(), FieldValue::Scalar(amount.to_string()));
            }
        }

        conform(&record, &self.schema)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_xml(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}
