//! Pricing
//!
//! The pricing engine: fare, upgrade and extras, then tax and gratuity, then
//! stacked promotions, then conversion into the target currency.

use jiff::Timestamp;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::{
    booking::{BookingContext, FareQuote},
    config::PricingConfig,
    currency::SupportedCurrency,
    discounts::apply_promotions,
    promotions::{PromotionRule, conditions::EligibilityContext, eligible_promotions},
    receipt::{AppliedPromotion, PricingBreakdown},
};

/// Stateless pricing engine bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Create an engine using `config`.
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price a booking as of now.
    ///
    /// Never fails: ineligible promotions are skipped and amounts beyond the
    /// range of [`Decimal`] saturate.
    pub fn calculate_pricing(
        &self,
        quote: &FareQuote,
        promotions: &[PromotionRule],
        booking: &BookingContext,
        currency: SupportedCurrency,
    ) -> PricingBreakdown {
        self.calculate_pricing_at(quote, promotions, booking, currency, Timestamp::now())
    }

    /// Price a booking as of `now`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(currency = currency.code(), promotions = promotions.len())
    )]
    pub fn calculate_pricing_at(
        &self,
        quote: &FareQuote,
        promotions: &[PromotionRule],
        booking: &BookingContext,
        currency: SupportedCurrency,
        now: Timestamp,
    ) -> PricingBreakdown {
        let converter = self.config.exchange_rates.converter(currency);

        let base_cruise_fare = quote.base_cruise_fare();
        let cabin_upgrade = quote.cabin_upgrade();
        let extras_total = quote.extras_total();
        let subtotal = base_cruise_fare
            .saturating_add(cabin_upgrade)
            .saturating_add(extras_total);

        let tax_amount = subtotal.saturating_mul(self.config.tax_rate);
        let gratuity_amount = subtotal.saturating_mul(self.config.gratuity_rate);
        let total_before_discounts = subtotal
            .saturating_add(tax_amount)
            .saturating_add(gratuity_amount);

        let ctx = EligibilityContext {
            booking,
            subtotal,
            now,
        };

        let eligible = eligible_promotions(promotions, &ctx);
        let outcome = apply_promotions(total_before_discounts, &eligible);
        let final_total = total_before_discounts
            .saturating_sub(outcome.total_discount)
            .max(Decimal::ZERO);

        debug!(
            %subtotal,
            %total_before_discounts,
            eligible = eligible.len(),
            applied = outcome.applied.len(),
            discount = %outcome.total_discount,
            %final_total,
            "priced booking"
        );

        let applied_promotions = outcome
            .applied
            .iter()
            .map(|applied| AppliedPromotion {
                id: applied.rule.id.clone(),
                name: applied.rule.name.clone(),
                discount_type: applied.rule.discount.discount_type(),
                value: applied.rule.discount.value(),
                discount_amount: converter.convert(applied.amount),
            })
            .collect();

        PricingBreakdown {
            base_cruise_fare: converter.convert(base_cruise_fare),
            cabin_upgrade: converter.convert(cabin_upgrade),
            extras_total: converter.convert(extras_total),
            subtotal: converter.convert(subtotal),
            tax_amount: converter.convert(tax_amount),
            gratuity_amount: converter.convert(gratuity_amount),
            discount_amount: converter.convert(outcome.total_discount),
            final_total: converter.convert(final_total),
            currency: currency.iso(),
            applied_promotions,
        }
    }
}

/// Price a booking as of now with the reference configuration.
pub fn calculate_pricing(
    quote: &FareQuote,
    promotions: &[PromotionRule],
    booking: &BookingContext,
    currency: SupportedCurrency,
) -> PricingBreakdown {
    PricingEngine::default().calculate_pricing(quote, promotions, booking, currency)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use rusty_money::{
        Money,
        iso::{self, Currency},
    };
    use testresult::TestResult;

    use crate::{
        booking::Extra,
        currency::{ExchangeRates, parse_currency},
        promotions::{Discount, conditions::PromotionConditions},
    };

    use super::*;

    fn usd(amount: Decimal) -> Money<'static, Currency> {
        Money::from_decimal(amount, iso::USD)
    }

    fn now() -> Result<Timestamp, jiff::Error> {
        "2026-05-01T12:00:00Z".parse()
    }

    fn booking() -> Result<BookingContext, jiff::Error> {
        Ok(BookingContext::new(2, "2026-08-01T00:00:00Z".parse()?))
    }

    fn rule(id: &str, discount: Discount) -> Result<PromotionRule, jiff::Error> {
        Ok(PromotionRule::new(
            id,
            id,
            discount,
            "2026-01-01T00:00:00Z".parse()?,
            "2026-12-31T23:59:59Z".parse()?,
        ))
    }

    fn reference_quote() -> FareQuote {
        FareQuote::new(dec!(500), dec!(1.2), 2).with_extra(Extra::new("Drinks", dec!(50), 2))
    }

    #[test]
    fn prices_reference_scenario_without_promotions() -> TestResult {
        let breakdown = PricingEngine::default().calculate_pricing_at(
            &reference_quote(),
            &[],
            &booking()?,
            SupportedCurrency::Usd,
            now()?,
        );

        assert_eq!(breakdown.base_cruise_fare(), usd(dec!(1000)));
        assert_eq!(breakdown.cabin_upgrade(), usd(dec!(200)));
        assert_eq!(breakdown.extras_total(), usd(dec!(100)));
        assert_eq!(breakdown.subtotal(), usd(dec!(1300)));
        assert_eq!(breakdown.tax_amount(), usd(dec!(123.50)));
        assert_eq!(breakdown.gratuity_amount(), usd(dec!(156.00)));
        assert_eq!(breakdown.discount_amount(), usd(Decimal::ZERO));
        assert_eq!(breakdown.final_total(), usd(dec!(1579.50)));
        assert!(breakdown.applied_promotions().is_empty());

        Ok(())
    }

    #[test]
    fn discounts_apply_to_total_after_tax_and_gratuity() -> TestResult {
        let promotions = [rule("ten", Discount::percentage(dec!(10)))?];

        let breakdown = PricingEngine::default().calculate_pricing_at(
            &reference_quote(),
            &promotions,
            &booking()?,
            SupportedCurrency::Usd,
            now()?,
        );

        assert_eq!(breakdown.discount_amount(), usd(dec!(157.95)));
        assert_eq!(breakdown.final_total(), usd(dec!(1421.55)));

        Ok(())
    }

    #[test]
    fn eligibility_uses_subtotal_not_total() -> TestResult {
        // Subtotal is 1300, total before discounts is 1579.50.
        let promotions = [rule("big-spender", Discount::fixed(dec!(100)))?.with_conditions(
            PromotionConditions {
                min_booking_amount: Some(dec!(1500)),
                ..PromotionConditions::default()
            },
        )];

        let breakdown = PricingEngine::default().calculate_pricing_at(
            &reference_quote(),
            &promotions,
            &booking()?,
            SupportedCurrency::Usd,
            now()?,
        );

        assert!(breakdown.applied_promotions().is_empty());
        assert_eq!(breakdown.final_total(), usd(dec!(1579.50)));

        Ok(())
    }

    #[test]
    fn final_total_is_floored_at_zero() -> TestResult {
        // A negative multiplier drives the subtotal below zero.
        let quote = FareQuote::new(dec!(100), dec!(-1), 1);

        let breakdown = PricingEngine::default().calculate_pricing_at(
            &quote,
            &[],
            &booking()?,
            SupportedCurrency::Usd,
            now()?,
        );

        assert_eq!(breakdown.cabin_upgrade(), usd(dec!(-200)));
        assert_eq!(breakdown.final_total(), usd(Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn injected_config_changes_rates() -> TestResult {
        let config = PricingConfig {
            tax_rate: Decimal::ZERO,
            gratuity_rate: Decimal::ZERO,
            exchange_rates: ExchangeRates::default().with_rate(SupportedCurrency::Eur, dec!(0.5)),
            ..PricingConfig::default()
        };

        let quote = FareQuote::new(dec!(300), Decimal::ONE, 1);

        let breakdown = PricingEngine::new(config).calculate_pricing_at(
            &quote,
            &[],
            &booking()?,
            SupportedCurrency::Eur,
            now()?,
        );

        assert_eq!(
            breakdown.final_total(),
            Money::from_decimal(dec!(150), iso::EUR)
        );
        assert_eq!(breakdown.currency(), iso::EUR);

        Ok(())
    }

    #[test]
    fn every_parsed_currency_can_be_priced() -> TestResult {
        let engine = PricingEngine::default();

        for code in ["USD", "eur", "SGD", "thb"] {
            let currency = parse_currency(code)?;
            let breakdown = engine.calculate_pricing_at(
                &reference_quote(),
                &[],
                &booking()?,
                currency,
                now()?,
            );

            assert_eq!(breakdown.currency(), currency.iso());
        }

        assert!(parse_currency("GBP").is_err());

        Ok(())
    }

    #[test]
    fn extreme_inputs_saturate_instead_of_panicking() -> TestResult {
        let fare = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
        let quote = FareQuote::new(fare, Decimal::ONE, 100_000_000);

        let breakdown = PricingEngine::default().calculate_pricing_at(
            &quote,
            &[],
            &booking()?,
            SupportedCurrency::Thb,
            now()?,
        );

        let saturated = Money::from_decimal(Decimal::MAX, iso::THB);

        assert_eq!(breakdown.subtotal(), saturated);
        assert_eq!(breakdown.final_total(), saturated);

        Ok(())
    }
}
