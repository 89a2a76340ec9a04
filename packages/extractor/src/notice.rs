//! Notice assembly: shared header plus the form groups of one document.

use crate::config::{
    CODIF_DATA_PATH, DOCUMENT_TYPE_KEY, FORM_SECTION_PATH, NOTICE_DATA_PATH, NO_DOC_OJS_KEY,
    ORIGINAL_CPV_KEY, REF_NOTICE_KEY, ROOT_KEY, URI_LIST_KEY,
};
use crate::error::{ExtractorError, Result};
use crate::flatten::Flattener;
use crate::forms::{select, FormGroup, Selection};
use crate::node::{find_by_path, DocumentNode, FieldValue, FlatRecord};

/// Header field holding the batch date.
pub const DATE_FIELD: &str = "DATE";
/// Header field holding the source file name.
pub const FILE_FIELD: &str = "FILE";
/// Header field holding the original CPV codes.
pub const ORIGINAL_CPV_CODE_FIELD: &str = "ORIGINAL_CPV_CODE";
/// Header field holding the original CPV descriptions.
pub const ORIGINAL_CPV_TEXT_FIELD: &str = "ORIGINAL_CPV_TEXT";
/// Header field holding the referenced notice number.
pub const REF_NO_FIELD: &str = "REF_NO";

/// One parsed notice document.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Publication date (`YYYYMMDD`) of the daily package.
    pub date: String,
    /// Source file name.
    pub file: String,
    /// Metadata shared by every form body of the notice.
    pub header: FlatRecord,
    /// One entry per key under `FORM_SECTION`, in document order.
    pub form_groups: Vec<FormGroup>,
    /// Recovered problems found while assembling the notice.
    pub warnings: Vec<String>,
}

impl Notice {
    /// Assemble a notice from a parsed document.
    ///
    /// The header is built, in order, from `DATE`, `FILE`, the flattened
    /// `CODIF_DATA` section, the flattened `NOTICE_DATA` section without its
    /// `URI_LIST`, the original CPV codes and texts, and `REF_NO`. Missing
    /// CPV or reference data is replaced by empty strings.
    ///
    /// # Errors
    /// Returns `MissingSection` only when the document has no `TED_EXPORT`
    /// root; every other gap is recorded in [`Notice::warnings`].
    pub fn from_document(doc: &DocumentNode, date: &str, file: &str) -> Result<Self> {
        Self::from_document_with(&Flattener::default(), doc, date, file)
    }

    /// Same as [`Notice::from_document`] with a caller-supplied flattener.
    pub fn from_document_with(
        flattener: &Flattener,
        doc: &DocumentNode,
        date: &str,
        file: &str,
    ) -> Result<Self> {
        if doc.get(ROOT_KEY).is_none() {
            return Err(ExtractorError::MissingSection {
                section: ROOT_KEY.to_string(),
                context: file.to_string(),
            });
        }

        let mut notice = Self {
            date: date.to_string(),
            file: file.to_string(),
            header: FlatRecord::new(),
            form_groups: Vec::new(),
            warnings: Vec::new(),
        };

        notice.header.accumulate(DATE_FIELD, date);
        notice.header.accumulate(FILE_FIELD, file);

        match find_by_path(doc, CODIF_DATA_PATH) {
            Some(codif) => flattener.flatten(codif, "", &mut notice.header),
            None => notice.warn_missing("CODIF_DATA"),
        }

        match find_by_path(doc, NOTICE_DATA_PATH) {
            Some(notice_data) => {
                let mut notice_data = notice_data.clone();
                notice_data.remove(URI_LIST_KEY);
                flattener.flatten(&notice_data, "", &mut notice.header);
                notice.add_original_cpv(&notice_data);
                notice.add_reference(&notice_data);
            }
            None => {
                notice.warn_missing("NOTICE_DATA");
                notice.set_placeholder(ORIGINAL_CPV_CODE_FIELD);
                notice.set_placeholder(ORIGINAL_CPV_TEXT_FIELD);
                notice.set_placeholder(REF_NO_FIELD);
            }
        }

        notice.collect_form_groups(doc);

        Ok(notice)
    }

    /// Select the form bodies of every group, paired with the header.
    pub fn select_forms(&self, language_filter: Option<&str>) -> Selection {
        let mut selection = Selection::default();
        for group in &self.form_groups {
            let Selection { pairs, warnings } = select(&self.header, group, language_filter);
            selection.pairs.extend(pairs);
            selection
                .warnings
                .extend(warnings.into_iter().map(|w| format!("{}: {w}", self.file)));
        }
        selection
    }

    fn add_original_cpv(&mut self, notice_data: &DocumentNode) {
        let entries: Vec<&DocumentNode> = match notice_data.get(ORIGINAL_CPV_KEY) {
            Some(DocumentNode::Sequence(items)) => items.iter().collect(),
            Some(entry) => vec![entry],
            None => {
                self.warn_missing(ORIGINAL_CPV_KEY);
                self.set_placeholder(ORIGINAL_CPV_CODE_FIELD);
                self.set_placeholder(ORIGINAL_CPV_TEXT_FIELD);
                return;
            }
        };

        let codes: Vec<String> = entries
            .iter()
            .map(|entry| {
                entry
                    .get("@CODE")
                    .and_then(DocumentNode::as_scalar)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        let texts: Vec<String> = entries
            .iter()
            .map(|entry| entry.text().unwrap_or_default().to_string())
            .collect();

        let as_list = entries.len() > 1;
        self.header
            .set(ORIGINAL_CPV_CODE_FIELD, cpv_value(codes, as_list));
        self.header
            .set(ORIGINAL_CPV_TEXT_FIELD, cpv_value(texts, as_list));
    }

    fn add_reference(&mut self, notice_data: &DocumentNode) {
        let reference = notice_data
            .get(REF_NOTICE_KEY)
            .and_then(|r| r.get(NO_DOC_OJS_KEY))
            .and_then(DocumentNode::text);

        match reference {
            Some(number) => self
                .header
                .set(REF_NO_FIELD, FieldValue::Scalar(number.to_string())),
            None => {
                tracing::debug!(file = %self.file, "No referenced notice");
                self.set_placeholder(REF_NO_FIELD);
            }
        }
    }

    fn collect_form_groups(&mut self, doc: &DocumentNode) {
        let Some(section) = find_by_path(doc, FORM_SECTION_PATH) else {
            self.warn_missing("FORM_SECTION");
            return;
        };

        let Some(groups) = section.as_mapping() else {
            let warning = format!(
                "{}: FORM_SECTION is a {}, expected a mapping",
                self.file,
                section.kind()
            );
            tracing::warn!(file = %self.file, "{}", warning);
            self.warnings.push(warning);
            return;
        };

        for (name, node) in groups {
            match FormGroup::from_node(name, node) {
                Ok(group) => self.form_groups.push(group),
                Err(e) => {
                    tracing::warn!(file = %self.file, form = %name, error = %e, "Skipping form group");
                    self.warnings.push(format!("{}: {e}", self.file));
                }
            }
        }
    }

    fn set_placeholder(&mut self, field: &str) {
        self.header.set(field, FieldValue::Scalar(String::new()));
    }

    fn warn_missing(&mut self, section: &str) {
        let e = ExtractorError::MissingSection {
            section: section.to_string(),
            context: self.file.clone(),
        };
        tracing::warn!(file = %self.file, section, "Missing notice section");
        self.warnings.push(e.to_string());
    }
}

fn cpv_value(values: Vec<String>, as_list: bool) -> FieldValue {
    if as_list {
        FieldValue::List(values)
    } else {
        FieldValue::Scalar(values.into_iter().next().unwrap_or_default())
    }
}

/// Document type of a notice, e.g. `Contract award notice`.
#[must_use]
pub fn document_type(doc: &DocumentNode) -> Option<String> {
    find_by_path(doc, CODIF_DATA_PATH)
        .and_then(|codif| codif.get(DOCUMENT_TYPE_KEY))
        .and_then(DocumentNode::text)
        .map(str::to_string)
}

/// Whether a document passes the document-type filter.
///
/// `None` accepts every document; a document without a type only passes
/// when there is no filter.
#[must_use]
pub fn accepts_document_type(doc: &DocumentNode, doc_types: Option<&[String]>) -> bool {
    let Some(doc_types) = doc_types else {
        return true;
    };
    document_type(doc).is_some_and(|t| doc_types.iter().any(|wanted| *wanted == t))
}
