//! Configuration constants and validation functions for the extractor.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ExtractorError, Result};

/// Separator placed between the segments of a flattened field path.
pub const PATH_SEPARATOR: &str = "__";

/// Delimiter used when a list value is collapsed into a SCALAR column.
pub const LIST_DELIMITER: &str = ";";

/// Language selected when the caller does not ask for another one.
pub const DEFAULT_LANGUAGE: &str = "EN";

/// Endpoint serving the latest EUR reference rates.
pub const EXCHANGE_RATES_URL: &str = "https://api.exchangeratesapi.io/latest";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Currency that needs no conversion.
pub const BASE_CURRENCY: &str = "EUR";

/// Document types kept by default; everything else in a daily package is skipped.
pub const DEFAULT_DOC_TYPES: &[&str] = &[
    "Contract award notice",
    "Contract notice",
    "Additional information",
];

/// Root element of every notice file.
pub const ROOT_KEY: &str = "TED_EXPORT";

/// Header sub-section holding the coded notice metadata.
pub const CODIF_DATA_PATH: &str = "TED_EXPORT/CODED_DATA_SECTION/CODIF_DATA";

/// Header sub-section holding the notice data (CPV codes, references).
pub const NOTICE_DATA_PATH: &str = "TED_EXPORT/CODED_DATA_SECTION/NOTICE_DATA";

/// Section holding one entry per form type, each with one or more language bodies.
pub const FORM_SECTION_PATH: &str = "TED_EXPORT/FORM_SECTION";

/// Link list inside `NOTICE_DATA`, left out of the header.
pub const URI_LIST_KEY: &str = "URI_LIST";

/// Original CPV classification entries inside `NOTICE_DATA`.
pub const ORIGINAL_CPV_KEY: &str = "ORIGINAL_CPV";

/// Reference to an earlier notice inside `NOTICE_DATA`.
pub const REF_NOTICE_KEY: &str = "REF_NOTICE";

/// Official journal number of the referenced notice.
pub const NO_DOC_OJS_KEY: &str = "NO_DOC_OJS";

/// Document type element inside `CODIF_DATA`.
pub const DOCUMENT_TYPE_KEY: &str = "TD_DOCUMENT_TYPE";

/// Language code pattern: two upper-case letters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LANGUAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("valid regex"));

/// Currency code pattern: three upper-case letters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CURRENCY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid regex"));

/// Daily package directory names start with YYYYMMDD, optionally followed by `_suffix`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BATCH_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{8})(?:_.*)?$").expect("valid regex"));

/// Validate a form language code.
///
/// # Examples
/// ```
/// use ted_extractor::config::validate_language;
///
/// assert!(validate_language("EN").is_ok());
/// assert!(validate_language("english").is_err());
/// ```
pub fn validate_language(language: &str) -> Result<()> {
    if LANGUAGE_PATTERN.is_match(language) {
        Ok(())
    } else {
        Err(ExtractorError::InvalidLanguage(language.to_string()))
    }
}

/// Validate an ISO 4217 currency code.
pub fn validate_currency_code(code: &str) -> Result<()> {
    if CURRENCY_PATTERN.is_match(code) {
        Ok(())
    } else {
        Err(ExtractorError::InvalidCurrency(code.to_string()))
    }
}

/// Extract the publication date from a daily package directory name.
///
/// # Arguments
/// * `dir_name` - Directory name such as `20190102_2019001`
///
/// # Returns
/// * `Ok(date)` with the `YYYYMMDD` prefix if it is a real calendar date
/// * `Err(ExtractorError::InvalidDate)` otherwise
///
/// # Examples
/// ```
/// use ted_extractor::config::parse_batch_date;
///
/// assert_eq!(parse_batch_date("20190102_2019001").unwrap(), "20190102");
/// assert!(parse_batch_date("20191302_2019001").is_err()); // Invalid month
/// ```
pub fn parse_batch_date(dir_name: &str) -> Result<String> {
    let date = BATCH_DATE_PATTERN
        .captures(dir_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ExtractorError::InvalidDate(dir_name.to_string()))?;

    chrono::NaiveDate::parse_from_str(date, "%Y%m%d")
        .map_err(|_| ExtractorError::InvalidDate(dir_name.to_string()))?;

    Ok(date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language_valid() {
        assert!(validate_language("EN").is_ok());
        assert!(validate_language("DE").is_ok());
        assert!(validate_language("FR").is_ok());
    }

    #[test]
    fn test_validate_language_invalid() {
        assert!(validate_language("").is_err());
        assert!(validate_language("en").is_err()); // Lowercase
        assert!(validate_language("ENG").is_err()); // Three letters
        assert!(validate_language("E1").is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("EUR").is_ok());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("").is_err());
    }

    #[test]
    fn test_parse_batch_date_valid() {
        assert_eq!(parse_batch_date("20190102_2019001").unwrap(), "20190102");
        assert_eq!(parse_batch_date("20171231").unwrap(), "20171231");
    }

    #[test]
    fn test_parse_batch_date_invalid_format() {
        assert!(parse_batch_date("").is_err());
        assert!(parse_batch_date("2019-01-02_2019001").is_err());
        assert!(parse_batch_date("201901_2019001").is_err());
        assert!(parse_batch_date("x20190102").is_err());
    }

    #[test]
    fn test_parse_batch_date_invalid_date() {
        assert!(parse_batch_date("20191301_001").is_err()); // Invalid month
        assert!(parse_batch_date("20190230_001").is_err()); // Invalid day
    }
}
