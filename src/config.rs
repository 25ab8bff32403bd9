//! Pricing Configuration
//!
//! Tax and gratuity rates, exchange rates and payment limits are injected
//! through [`PricingConfig`] rather than read from globals.

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rust_decimal_macros::dec;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    currency::{CurrencyError, ExchangeRates, parse_currency},
    payments::{AmountLimits, PaymentLimits},
};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code in a rate or limits table
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Exchange rate that is zero or negative
    #[error("Exchange rate for {currency} must be positive, got {rate}")]
    InvalidRate {
        /// ISO code
        currency: String,
        /// Configured rate
        rate: Decimal,
    },

    /// Tax or gratuity rate that is negative
    #[error("{name} must not be negative, got {value}")]
    NegativeRate {
        /// Setting name
        name: &'static str,
        /// Configured value
        value: Decimal,
    },

    /// Payment limits with `min` above `max`
    #[error("Payment limits for {currency} have min {min} above max {max}")]
    InvalidLimits {
        /// ISO code
        currency: String,
        /// Configured minimum
        min: Decimal,
        /// Configured maximum
        max: Decimal,
    },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    /// Tax as a fraction of the subtotal
    pub tax_rate: Decimal,

    /// Gratuity as a fraction of the subtotal
    pub gratuity_rate: Decimal,

    /// Reference-to-target exchange rates; unset currencies use their reference rate
    pub exchange_rates: ExchangeRates,

    /// Per-currency charge limits
    pub payment_limits: PaymentLimits,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: dec!(0.095),
            gratuity_rate: dec!(0.12),
            exchange_rates: ExchangeRates::default(),
            payment_limits: PaymentLimits::default(),
        }
    }
}

/// YAML shape of the configuration file; every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    tax_rate: Option<Decimal>,
    gratuity_rate: Option<Decimal>,
    exchange_rates: Option<FxHashMap<String, Decimal>>,
    payment_limits: Option<FxHashMap<String, LimitsFile>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LimitsFile {
    min: Decimal,
    max: Decimal,
}

impl PricingConfig {
    /// Parse a YAML configuration. Absent sections keep their defaults.
    /// Listed exchange rates override the reference rates one currency at a
    /// time; a present limits table replaces the default table entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, names an unsupported
    /// currency, or contains a non-positive exchange rate, a negative tax or
    /// gratuity rate, or limits with `min` above `max`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_norway::from_str(yaml)?;
        let mut config = Self::default();

        if let Some(tax_rate) = file.tax_rate {
            config.tax_rate = non_negative("tax_rate", tax_rate)?;
        }

        if let Some(gratuity_rate) = file.gratuity_rate {
            config.gratuity_rate = non_negative("gratuity_rate", gratuity_rate)?;
        }

        if let Some(rates) = file.exchange_rates {
            config.exchange_rates = exchange_rates(rates)?;
        }

        if let Some(limits) = file.payment_limits {
            config.payment_limits = payment_limits(limits)?;
        }

        Ok(config)
    }

    /// Load a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or any error from
    /// [`PricingConfig::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }
}

fn non_negative(name: &'static str, value: Decimal) -> Result<Decimal, ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::NegativeRate { name, value });
    }

    Ok(value)
}

fn exchange_rates(rates: FxHashMap<String, Decimal>) -> Result<ExchangeRates, ConfigError> {
    let mut table = ExchangeRates::default();

    for (code, rate) in rates {
        let currency = parse_currency(&code)?;

        if rate <= Decimal::ZERO {
            return Err(ConfigError::InvalidRate {
                currency: code,
                rate,
            });
        }

        table.insert(currency, rate);
    }

    Ok(table)
}

fn payment_limits(limits: FxHashMap<String, LimitsFile>) -> Result<PaymentLimits, ConfigError> {
    let mut table = PaymentLimits::empty();

    for (code, LimitsFile { min, max }) in limits {
        let currency = parse_currency(&code)?;

        match (to_minor(min), to_minor(max)) {
            (Some(min_minor), Some(max_minor)) if min_minor <= max_minor => {
                table.insert(AmountLimits::new(currency.iso(), min_minor, max_minor));
            }
            _ => {
                return Err(ConfigError::InvalidLimits {
                    currency: code,
                    min,
                    max,
                });
            }
        }
    }

    Ok(table)
}

/// Major units to minor units, rejecting sub-cent precision loss.
fn to_minor(amount: Decimal) -> Option<i64> {
    let minor = amount.checked_mul(Decimal::ONE_HUNDRED)?;

    if minor.fract() != Decimal::ZERO {
        return None;
    }

    minor.to_i64()
}
