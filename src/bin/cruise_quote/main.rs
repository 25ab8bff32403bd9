//! Cruise quote command-line tool

use std::io;

use anyhow::Context;
use cruise_pricing::prelude::*;
use tracing::info;

use crate::config::QuoteConfig;

mod config;
mod logging;

fn main() -> anyhow::Result<()> {
    let config = QuoteConfig::load()?;

    logging::init_subscriber(&config.logging).context("failed to initialise logging")?;

    let pricing_config = match &config.config {
        Some(path) => PricingConfig::load(path)
            .with_context(|| format!("failed to load pricing config {}", path.display()))?,
        None => PricingConfig::default(),
    };

    let catalog = match &config.promotions {
        Some(path) => PromotionCatalog::load(path)
            .with_context(|| format!("failed to load promotions {}", path.display()))?,
        None => PromotionCatalog::default(),
    };

    let currency = parse_currency(&config.currency)?;
    let engine = PricingEngine::new(pricing_config);

    info!(
        promotions = catalog.len(),
        currency = currency.code(),
        "pricing booking"
    );

    let breakdown = engine.calculate_pricing(
        &config.booking.quote(),
        catalog.promotions(),
        &config.booking.context(),
        currency,
    );

    breakdown.write_to(io::stdout().lock())?;

    engine
        .config()
        .payment_limits
        .validate(*breakdown.final_total().amount(), currency.code())
        .context("quote cannot be charged")?;

    Ok(())
}
