//! Cruise Pricing
//!
//! Cruise booking pricing and promotion engine: fares, cabin upgrades, extras,
//! tax and gratuity, stacked promotions and multi-currency output.

pub mod booking;
pub mod catalog;
pub mod config;
pub mod currency;
pub mod discounts;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod receipt;
