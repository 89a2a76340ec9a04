//! Element-wise conversion of (value, currency) pairs.

use std::fmt;

use super::rates::ExchangeRateTable;
use crate::config::{BASE_CURRENCY, LIST_DELIMITER};
use crate::error::{ExtractorError, Result};
use crate::node::FieldValue;

/// A value expressed in euros.
#[derive(Debug, Clone, PartialEq)]
pub enum EurAmount {
    /// Already in euros; the literal value is kept as written.
    Original(String),
    /// Converted from another currency.
    Converted(f64),
}

impl fmt::Display for EurAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original(s) => f.write_str(s),
            Self::Converted(v) => write!(f, "{v}"),
        }
    }
}

/// Convert one amount to euros.
///
/// Euro amounts pass through untouched. Other amounts are divided by the
/// currency's rate. `None` when the rate is unknown or the amount is not a
/// number.
///
/// # Examples
/// ```
/// use ted_extractor::currency::{convert_one, EurAmount, ExchangeRateTable};
///
/// let rates: ExchangeRateTable = [("USD", 2.0)].into_iter().collect();
/// assert_eq!(convert_one("10", "USD", &rates), Some(EurAmount::Converted(5.0)));
/// assert_eq!(convert_one("10", "XYZ", &rates), None);
/// ```
#[must_use]
pub fn convert_one(value: &str, currency: &str, rates: &ExchangeRateTable) -> Option<EurAmount> {
    if currency == BASE_CURRENCY {
        return Some(EurAmount::Original(value.to_string()));
    }

    let Some(rate) = rates.get(currency) else {
        tracing::debug!(currency = %currency, "No exchange rate for currency");
        return None;
    };

    match value.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Some(EurAmount::Converted(amount / rate)),
        _ => {
            tracing::debug!(value = %value, currency = %currency, "Amount is not a number");
            None
        }
    }
}

/// Convert parallel value and currency columns.
///
/// This is the batch entry point; each pair goes through [`convert_one`], so
/// a miss only empties that element.
///
/// # Errors
/// Returns `CurrencyLengthMismatch` when the columns differ in length.
pub fn convert(
    values: &[String],
    currencies: &[String],
    rates: &ExchangeRateTable,
) -> Result<Vec<Option<EurAmount>>> {
    if values.len() != currencies.len() {
        return Err(ExtractorError::CurrencyLengthMismatch {
            values: values.len(),
            currencies: currencies.len(),
        });
    }

    Ok(values
        .iter()
        .zip(currencies)
        .map(|(value, currency)| convert_one(value, currency, rates))
        .collect())
}

/// Convert the value and currency fields of one record.
///
/// Repeated values are joined first, so only a single amount in a single
/// currency converts.
#[must_use]
pub fn convert_field(
    value: Option<&FieldValue>,
    currency: Option<&FieldValue>,
    rates: &ExchangeRateTable,
) -> Option<EurAmount> {
    let values = [value?.joined(LIST_DELIMITER)];
    let currencies = [currency?.joined(LIST_DELIMITER)];
    convert(&values, &currencies, rates).ok()?.pop().flatten()
}
