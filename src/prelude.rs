//! Cruise pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    booking::{BookingContext, Extra, FareQuote},
    catalog::{CatalogError, PromotionCatalog},
    config::{ConfigError, PricingConfig},
    currency::{CurrencyError, ExchangeRates, SupportedCurrency, parse_currency},
    discounts::{AppliedDiscount, DiscountOutcome, apply_promotions},
    payments::{
        AmountLimits, PaymentAmountError, PaymentLimits, validate_minor_amount,
        validate_payment_amount,
    },
    pricing::{PricingEngine, calculate_pricing},
    promotions::{
        Discount, DiscountType, PromotionError, PromotionRecord, PromotionRule,
        conditions::{EligibilityContext, PromotionConditions, UnmetCondition},
        eligible_promotions,
    },
    receipt::{AppliedPromotion, PricingBreakdown, ReceiptError},
};
