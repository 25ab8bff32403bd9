//! Command-line configuration

use std::path::PathBuf;

use clap::{Args, Parser};
use cruise_pricing::booking::{BookingContext, Extra, FareQuote};
use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Booking being quoted.
#[derive(Debug, Args)]
pub(crate) struct BookingArgs {
    /// Per-guest base fare in the reference currency
    #[arg(long)]
    pub base_price: Decimal,

    /// Cabin category multiplier (1 is the base cabin)
    #[arg(long, default_value = "1")]
    pub cabin_multiplier: Decimal,

    /// Number of guests
    #[arg(long, default_value_t = 1)]
    pub guests: u32,

    /// Number of children among the guests
    #[arg(long, default_value_t = 0)]
    pub children: u32,

    /// Number of seniors among the guests
    #[arg(long, default_value_t = 0)]
    pub seniors: u32,

    /// Add-on as NAME=PRICE or NAME=PRICE x QTY, e.g. "Drinks package=50x2"
    #[arg(long = "extra", value_parser = parse_extra)]
    pub extras: Vec<Extra>,

    /// Cruise line
    #[arg(long, default_value = "")]
    pub cruise_line: String,

    /// Destination
    #[arg(long, default_value = "")]
    pub destination: String,

    /// Cabin type
    #[arg(long, default_value = "")]
    pub cabin_type: String,

    /// Departure date and time (RFC 3339)
    #[arg(long)]
    pub departure: Timestamp,
}

impl BookingArgs {
    pub(crate) fn quote(&self) -> FareQuote {
        FareQuote {
            base_price: self.base_price,
            cabin_multiplier: self.cabin_multiplier,
            guest_count: self.guests,
            extras: self.extras.clone(),
        }
    }

    pub(crate) fn context(&self) -> BookingContext {
        BookingContext {
            guest_count: self.guests,
            child_count: self.children,
            senior_count: self.seniors,
            cruise_line: self.cruise_line.clone(),
            destination: self.destination.clone(),
            cabin_type: self.cabin_type.clone(),
            departure_date: self.departure,
        }
    }
}

/// Cruise quote configuration
#[derive(Debug, Parser)]
#[command(name = "cruise-quote", about = "Price a cruise booking", long_about = None)]
pub(crate) struct QuoteConfig {
    /// Booking details.
    #[command(flatten)]
    pub booking: BookingArgs,

    /// Promotion catalog (YAML)
    #[arg(long, env = "CRUISE_PROMOTIONS")]
    pub promotions: Option<PathBuf>,

    /// Pricing configuration (YAML)
    #[arg(long, env = "CRUISE_PRICING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Currency to quote in
    #[arg(long, env = "CRUISE_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl QuoteConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Extra argument parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ExtraParseError {
    /// Missing `=` between name and price
    #[error("expected NAME=PRICExQTY, got {0:?}")]
    Shape(String),

    /// Price is not a decimal number
    #[error("invalid price {0:?}")]
    Price(String),

    /// Quantity is not a whole number
    #[error("invalid quantity {0:?}")]
    Quantity(String),
}

/// Parse `NAME=PRICE` or `NAME=PRICExQTY`.
pub(crate) fn parse_extra(value: &str) -> Result<Extra, ExtraParseError> {
    let (name, amount) = value
        .rsplit_once('=')
        .ok_or_else(|| ExtraParseError::Shape(value.to_string()))?;

    let (price, quantity) = amount
        .split_once(['x', 'X'])
        .unwrap_or((amount, "1"));

    let price: Decimal = price
        .trim()
        .parse()
        .map_err(|_err| ExtraParseError::Price(price.to_string()))?;

    let quantity: u32 = quantity
        .trim()
        .parse()
        .map_err(|_err| ExtraParseError::Quantity(quantity.to_string()))?;

    Ok(Extra::new(name.trim(), price, quantity))
}
