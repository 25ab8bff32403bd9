//! Currencies & Exchange Rates
//!
//! Every amount is computed in the reference currency (USD) and only converted
//! into the target currency when the breakdown is produced.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Currency lookup errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    /// The currency code is not one the engine prices in.
    #[error("Unsupported currency: {0}")]
    Unsupported(String),
}

/// Currencies the engine knows how to price in.
///
/// Every variant has a reference exchange rate, so conversion into one can
/// never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedCurrency {
    /// US dollar, the reference currency
    Usd,

    /// Euro
    Eur,

    /// Singapore dollar
    Sgd,

    /// Thai baht
    Thb,
}

impl SupportedCurrency {
    /// All supported currencies.
    pub const ALL: [Self; 4] = [Self::Usd, Self::Eur, Self::Sgd, Self::Thb];

    /// The ISO currency used for output amounts.
    pub fn iso(self) -> &'static Currency {
        match self {
            Self::Usd => iso::USD,
            Self::Eur => iso::EUR,
            Self::Sgd => iso::SGD,
            Self::Thb => iso::THB,
        }
    }

    /// ISO 4217 alphabetic code.
    pub fn code(self) -> &'static str {
        self.iso().iso_alpha_code
    }

    /// Built-in rate from one reference unit.
    pub fn reference_rate(self) -> Decimal {
        match self {
            Self::Usd => Decimal::ONE,
            Self::Eur => dec!(0.85),
            Self::Sgd => dec!(1.35),
            Self::Thb => dec!(32.5),
        }
    }
}

impl fmt::Display for SupportedCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SupportedCurrency {
    type Err = CurrencyError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        parse_currency(code)
    }
}

/// Parse an ISO 4217 code (e.g. `"usd"`, `" THB "`) into a supported currency.
///
/// # Errors
///
/// Returns [`CurrencyError::Unsupported`] if the code is not one of
/// [`SupportedCurrency::ALL`].
pub fn parse_currency(code: &str) -> Result<SupportedCurrency, CurrencyError> {
    let normalised = code.trim().to_ascii_uppercase();

    SupportedCurrency::ALL
        .into_iter()
        .find(|currency| currency.code() == normalised)
        .ok_or_else(|| CurrencyError::Unsupported(code.to_string()))
}

/// Round to two decimal places, halves towards positive infinity.
///
/// This is `floor(amount × 100 + 0.5) / 100`, so `-2.345` becomes `-2.34`
/// rather than `-2.35`. Amounts too large to scale have no fractional cents
/// left and are returned as they are.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.checked_add(dec!(0.5)))
        .map_or(amount, |cents| cents.floor() / Decimal::ONE_HUNDRED)
}

/// Exchange rates from the reference currency.
///
/// Currencies without a configured rate use their
/// [`SupportedCurrency::reference_rate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRates {
    overrides: FxHashMap<SupportedCurrency, Decimal>,
}

impl ExchangeRates {
    /// Add or replace the rate for a currency.
    #[must_use]
    pub fn with_rate(mut self, currency: SupportedCurrency, rate: Decimal) -> Self {
        self.insert(currency, rate);
        self
    }

    /// Add or replace the rate for a currency.
    pub fn insert(&mut self, currency: SupportedCurrency, rate: Decimal) {
        self.overrides.insert(currency, rate);
    }

    /// Rate for converting one reference unit into `currency`.
    pub fn rate(&self, currency: SupportedCurrency) -> Decimal {
        self.overrides
            .get(&currency)
            .copied()
            .unwrap_or_else(|| currency.reference_rate())
    }

    /// Build a converter bound to a single target currency.
    pub fn converter(&self, currency: SupportedCurrency) -> Converter {
        Converter {
            rate: self.rate(currency),
            currency,
        }
    }

    /// Convert a reference-currency amount into `currency`, rounded to cents.
    pub fn convert(&self, amount: Decimal, currency: SupportedCurrency) -> Money<'static, Currency> {
        self.converter(currency).convert(amount)
    }
}

/// Converts reference-currency amounts into one target currency.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    rate: Decimal,
    currency: SupportedCurrency,
}

impl Converter {
    /// Target currency.
    pub fn currency(&self) -> SupportedCurrency {
        self.currency
    }

    /// Exchange rate applied by this converter.
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Convert and round a single amount.
    pub fn convert(&self, amount: Decimal) -> Money<'static, Currency> {
        Money::from_decimal(self.convert_decimal(amount), self.currency.iso())
    }

    /// Convert and round a single amount, returning the bare decimal.
    ///
    /// Results beyond the range of [`Decimal`] saturate.
    pub fn convert_decimal(&self, amount: Decimal) -> Decimal {
        round_to_cents(amount.saturating_mul(self.rate))
    }
}
