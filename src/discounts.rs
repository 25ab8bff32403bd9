//! Discounts
//!
//! Applies eligible promotions, in priority order, to the post-tax total.

use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::debug;

use crate::promotions::PromotionRule;

/// A promotion that granted a non-zero discount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedDiscount<'a> {
    /// The rule that was applied
    pub rule: &'a PromotionRule,

    /// Amount granted, in the reference currency
    pub amount: Decimal,
}

/// Result of running the stacking pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountOutcome<'a> {
    /// Applied promotions, in application order
    pub applied: SmallVec<[AppliedDiscount<'a>; 4]>,

    /// Sum of all applied amounts
    pub total_discount: Decimal,
}

/// Apply `eligible` (already sorted by priority) to `total`.
///
/// Each rule is evaluated against what is left after the rules applied before
/// it. Rules that grant nothing are skipped; a non-combinable rule that grants
/// a discount is the last one applied.
pub fn apply_promotions<'a>(total: Decimal, eligible: &[&'a PromotionRule]) -> DiscountOutcome<'a> {
    let mut outcome = DiscountOutcome::default();
    let mut remaining = total;

    for &rule in eligible {
        let amount = rule.discount.amount_on(remaining);

        if amount <= Decimal::ZERO {
            debug!(promotion = %rule.id, %remaining, "promotion grants no discount");

            continue;
        }

        debug!(
            promotion = %rule.id,
            priority = rule.priority,
            %amount,
            %remaining,
            "applied promotion"
        );

        outcome.applied.push(AppliedDiscount { rule, amount });
        outcome.total_discount = outcome.total_discount.saturating_add(amount);

        if !rule.is_combinable {
            break;
        }

        remaining = remaining.saturating_sub(amount);
    }

    outcome
}
