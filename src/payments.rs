//! Payment Amount Limits
//!
//! One canonical per-currency limits table, stored in minor units, shared by
//! the advisory validator (major units) and the payment-intent path (minor
//! units).

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

use crate::currency::parse_currency;

/// Decimal places of every supported currency's minor unit.
const MINOR_UNIT_SCALE: u32 = 2;

/// Shared upper bound: 999,999.99 in major units.
const DEFAULT_MAX_MINOR: i64 = 99_999_999;

/// Reasons a proposed charge amount is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentAmountError {
    /// Below the processor minimum.
    #[error("Amount too small. Minimum is {min} {currency}")]
    TooSmall {
        /// Minimum chargeable amount, major units
        min: Decimal,
        /// ISO code
        currency: &'static str,
    },

    /// Above the processor maximum.
    #[error("Amount too large. Maximum is {max} {currency}")]
    TooLarge {
        /// Maximum chargeable amount, major units
        max: Decimal,
        /// ISO code
        currency: &'static str,
    },

    /// No limits are configured for the currency.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

/// Inclusive charge bounds for one currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountLimits {
    currency: &'static Currency,
    min_minor: i64,
    max_minor: i64,
}

impl AmountLimits {
    /// Create limits from minor-unit bounds.
    pub fn new(currency: &'static Currency, min_minor: i64, max_minor: i64) -> Self {
        Self {
            currency,
            min_minor,
            max_minor,
        }
    }

    /// Currency the limits apply to.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Minimum, minor units
    pub fn min_minor(&self) -> i64 {
        self.min_minor
    }

    /// Maximum, minor units
    pub fn max_minor(&self) -> i64 {
        self.max_minor
    }

    /// Minimum, major units
    pub fn min(&self) -> Decimal {
        Decimal::new(self.min_minor, MINOR_UNIT_SCALE)
    }

    /// Maximum, major units
    pub fn max(&self) -> Decimal {
        Decimal::new(self.max_minor, MINOR_UNIT_SCALE)
    }

    /// Check a major-unit amount.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentAmountError::TooSmall`] or [`PaymentAmountError::TooLarge`]
    /// when `amount` falls outside the bounds.
    pub fn check(&self, amount: Decimal) -> Result<(), PaymentAmountError> {
        if amount < self.min() {
            return Err(PaymentAmountError::TooSmall {
                min: self.min(),
                currency: self.currency.iso_alpha_code,
            });
        }

        if amount > self.max() {
            return Err(PaymentAmountError::TooLarge {
                max: self.max(),
                currency: self.currency.iso_alpha_code,
            });
        }

        Ok(())
    }

    /// Check a minor-unit amount.
    ///
    /// # Errors
    ///
    /// Same as [`AmountLimits::check`].
    pub fn check_minor(&self, minor: i64) -> Result<(), PaymentAmountError> {
        self.check(Decimal::new(minor, MINOR_UNIT_SCALE))
    }
}

/// Per-currency charge limits.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLimits {
    limits: FxHashMap<&'static str, AmountLimits>,
}

impl PaymentLimits {
    /// An empty table; every currency is unsupported.
    pub fn empty() -> Self {
        Self {
            limits: FxHashMap::default(),
        }
    }

    /// Add or replace the limits for a currency.
    #[must_use]
    pub fn with_limits(mut self, limits: AmountLimits) -> Self {
        self.insert(limits);
        self
    }

    /// Add or replace the limits for a currency.
    pub fn insert(&mut self, limits: AmountLimits) {
        self.limits.insert(limits.currency.iso_alpha_code, limits);
    }

    /// Limits configured for `currency`.
    pub fn limits_for(&self, currency: &Currency) -> Option<AmountLimits> {
        self.limits.get(currency.iso_alpha_code).copied()
    }

    /// Validate a major-unit amount for an ISO currency code.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentAmountError::UnsupportedCurrency`] for unknown codes,
    /// otherwise the bound that was violated.
    pub fn validate(&self, amount: Decimal, currency_code: &str) -> Result<(), PaymentAmountError> {
        self.lookup(currency_code)?.check(amount)
    }

    /// Validate a minor-unit amount, as sent when creating a payment intent.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentAmountError::UnsupportedCurrency`] if `currency` has no
    /// limits, otherwise the bound that was violated.
    pub fn validate_minor(
        &self,
        minor: i64,
        currency: &'static Currency,
    ) -> Result<(), PaymentAmountError> {
        self.limits_for(currency)
            .ok_or_else(|| {
                PaymentAmountError::UnsupportedCurrency(currency.iso_alpha_code.to_string())
            })?
            .check_minor(minor)
    }

    fn lookup(&self, currency_code: &str) -> Result<AmountLimits, PaymentAmountError> {
        let unsupported = || PaymentAmountError::UnsupportedCurrency(currency_code.to_string());

        let currency = parse_currency(currency_code).map_err(|_err| unsupported())?;

        self.limits_for(currency.iso()).ok_or_else(unsupported)
    }
}

impl Default for PaymentLimits {
    fn default() -> Self {
        Self::empty()
            .with_limits(AmountLimits::new(iso::USD, 50, DEFAULT_MAX_MINOR))
            .with_limits(AmountLimits::new(iso::EUR, 50, DEFAULT_MAX_MINOR))
            .with_limits(AmountLimits::new(iso::SGD, 50, DEFAULT_MAX_MINOR))
            .with_limits(AmountLimits::new(iso::THB, 2_000, DEFAULT_MAX_MINOR))
    }
}

/// Validate a major-unit amount against the default limits table.
///
/// # Errors
///
/// See [`PaymentLimits::validate`].
pub fn validate_payment_amount(amount: Decimal, currency_code: &str) -> Result<(), PaymentAmountError> {
    PaymentLimits::default().validate(amount, currency_code)
}

/// Validate a minor-unit amount against the default limits table.
///
/// # Errors
///
/// See [`PaymentLimits::validate_minor`].
pub fn validate_minor_amount(
    minor: i64,
    currency: &'static Currency,
) -> Result<(), PaymentAmountError> {
    PaymentLimits::default().validate_minor(minor, currency)
}
