//! Exchange-rate table and its HTTP source.

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::{validate_currency_code, BASE_CURRENCY};
use crate::error::{ExtractorError, Result};
use crate::http::{download_bytes_with, RetryPolicy};

/// Rates from ISO currency code to EUR, fixed for one batch.
///
/// A rate `r` for code `C` means one euro buys `r` units of `C`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRateTable {
    rates: HashMap<String, f64>,
}

/// Payload of the rate endpoint.
#[derive(Debug, Deserialize)]
struct RatePayload {
    #[serde(default)]
    base: Option<String>,
    rates: HashMap<String, f64>,
}

impl ExchangeRateTable {
    /// Create an empty table. Every lookup misses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a `{"base": "EUR", "rates": {...}}` payload.
    ///
    /// Entries with an invalid code or a rate that is not a positive finite
    /// number are left out.
    ///
    /// # Errors
    /// Returns `Json` for a malformed payload and `InvalidCurrency` when
    /// the rates are not quoted against EUR.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let payload: RatePayload = serde_json::from_slice(bytes)?;

        if let Some(base) = payload.base.as_deref() {
            if base != BASE_CURRENCY {
                return Err(ExtractorError::InvalidCurrency(format!(
                    "{base} (rates must be quoted against {BASE_CURRENCY})"
                )));
            }
        }

        Ok(payload.rates.into_iter().collect())
    }

    /// Rate for a currency code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ExchangeRateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut rates = HashMap::new();
        for (code, rate) in iter {
            let code = code.into();
            if validate_currency_code(&code).is_err() || !rate.is_finite() || rate <= 0.0 {
                tracing::warn!(currency = %code, rate, "Ignoring invalid exchange rate");
                continue;
            }
            rates.insert(code, rate);
        }
        Self { rates }
    }
}

/// Fetch the current rate table.
///
/// Transient failures are retried with the default [`RetryPolicy`].
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - Rate endpoint returning a JSON payload
pub fn fetch_rates(client: &Client, url: &str) -> Result<ExchangeRateTable> {
    fetch_rates_with(client, url, RetryPolicy::default())
}

/// Fetch the current rate table with an explicit retry policy.
pub fn fetch_rates_with(
    client: &Client,
    url: &str,
    policy: RetryPolicy,
) -> Result<ExchangeRateTable> {
    tracing::debug!(url = %url, "Fetching exchange rates");
    let bytes = download_bytes_with(client, url, policy)?;
    let table = ExchangeRateTable::from_json(&bytes)?;
    tracing::info!(currencies = table.len(), "Loaded exchange rates");
    Ok(table)
}
