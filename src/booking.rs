//! Bookings
//!
//! Caller-supplied fare inputs and the booking context used for promotion
//! eligibility. The engine only ever reads these.

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use serde::Deserialize;

const MILLIS_PER_DAY: i128 = 86_400_000;

/// A priced add-on (drinks package, shore excursion, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Extra {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Unit price in the reference currency
    pub price: Decimal,

    /// Number of units
    pub quantity: u32,
}

impl Extra {
    /// Create a new extra.
    pub fn new(name: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    /// `price × quantity`
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Fare inputs for a single pricing calculation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareQuote {
    /// Per-guest base fare in the reference currency
    pub base_price: Decimal,

    /// Cabin price multiplier (1.0 is the base cabin)
    pub cabin_multiplier: Decimal,

    /// Number of guests paying the fare
    pub guest_count: u32,

    /// Selected extras
    #[serde(default)]
    pub extras: Vec<Extra>,
}

impl FareQuote {
    /// Create a quote with no extras.
    pub fn new(base_price: Decimal, cabin_multiplier: Decimal, guest_count: u32) -> Self {
        Self {
            base_price,
            cabin_multiplier,
            guest_count,
            extras: Vec::new(),
        }
    }

    /// Add an extra.
    #[must_use]
    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extras.push(extra);
        self
    }

    /// `base_price × guest_count`
    pub fn base_cruise_fare(&self) -> Decimal {
        self.base_price.saturating_mul(Decimal::from(self.guest_count))
    }

    /// `base_price × (cabin_multiplier − 1) × guest_count`.
    ///
    /// Not clamped: a multiplier below one yields a negative upgrade.
    pub fn cabin_upgrade(&self) -> Decimal {
        self.base_price
            .saturating_mul(self.cabin_multiplier.saturating_sub(Decimal::ONE))
            .saturating_mul(Decimal::from(self.guest_count))
    }

    /// Sum of all extra line totals.
    pub fn extras_total(&self) -> Decimal {
        self.extras
            .iter()
            .map(Extra::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

/// Booking facts checked by promotion conditions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingContext {
    /// Total number of guests
    pub guest_count: u32,

    /// Guests counted as children
    #[serde(default)]
    pub child_count: u32,

    /// Guests counted as seniors
    #[serde(default)]
    pub senior_count: u32,

    /// Operating cruise line
    #[serde(default)]
    pub cruise_line: String,

    /// Destination region
    #[serde(default)]
    pub destination: String,

    /// Cabin category
    #[serde(default)]
    pub cabin_type: String,

    /// Departure instant
    pub departure_date: Timestamp,
}

impl BookingContext {
    /// Create a context for `guest_count` adults departing at `departure_date`.
    pub fn new(guest_count: u32, departure_date: Timestamp) -> Self {
        Self {
            guest_count,
            child_count: 0,
            senior_count: 0,
            cruise_line: String::new(),
            destination: String::new(),
            cabin_type: String::new(),
            departure_date,
        }
    }

    /// Whole days until departure as seen from `now`, rounded up.
    pub fn days_until_departure(&self, now: Timestamp) -> i64 {
        days_until(self.departure_date.duration_since(now))
    }
}

/// `ceil(duration / 1 day)` at millisecond resolution.
fn days_until(duration: SignedDuration) -> i64 {
    let millis = duration.as_millis();
    let whole = millis / MILLIS_PER_DAY;

    let days = if millis % MILLIS_PER_DAY > 0 {
        whole + 1
    } else {
        whole
    };

    i64::try_from(days).unwrap_or(if days > 0 { i64::MAX } else { i64::MIN })
}
