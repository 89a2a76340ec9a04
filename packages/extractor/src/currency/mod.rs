//! Conversion of monetary values to euros.
//!
//! Rates are fetched once per batch into an [`ExchangeRateTable`] and then
//! applied element-wise. A missing rate or an unparseable amount only
//! affects the field it occurs in.

mod convert;
mod rates;

pub use convert::{convert, convert_field, convert_one, EurAmount};
pub use rates::{fetch_rates, fetch_rates_with, ExchangeRateTable};
