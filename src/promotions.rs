//! Promotions

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::promotions::conditions::{EligibilityContext, PromotionConditions};

pub mod conditions;

/// Errors raised when a promotion record cannot become a rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    /// `discountType` was neither `percentage` nor `fixed`.
    #[error("unknown discount type {0:?}")]
    UnknownDiscountType(String),

    /// `discountValue` (or `maxDiscount`) was negative.
    #[error("discount value must not be negative, got {0}")]
    NegativeValue(Decimal),

    /// A percentage rule above 100 percent.
    #[error("percentage discount must be at most 100, got {0}")]
    PercentageOutOfRange(Decimal),

    /// `validFrom` is after `validTo`.
    #[error("validity window starts at {from} but ends at {to}")]
    InvalidWindow {
        /// Start of the window
        from: Timestamp,
        /// End of the window
        to: Timestamp,
    },
}

/// The two discount shapes a promotion can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountType {
    /// Percentage of the remaining amount
    Percentage,

    /// Flat amount off
    Fixed,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage => f.write_str("percentage"),
            Self::Fixed => f.write_str("fixed"),
        }
    }
}

/// Discount granted by a promotion.
#[derive(Debug, Clone, Copy)]
pub enum Discount {
    /// Take a percentage of the remaining amount, optionally capped.
    Percentage {
        /// Fraction to take off (0.10 for 10%)
        percent: Percentage,

        /// Percentage points as configured
        points: Decimal,

        /// Largest discount this rule may grant
        cap: Option<Decimal>,
    },

    /// Take a flat amount off, never more than what remains.
    Fixed(Decimal),
}

impl Discount {
    /// `points` percent off, uncapped. Points are clamped to `0..=100`.
    pub fn percentage(points: Decimal) -> Self {
        Self::bounded_percentage(points, None)
    }

    /// `points` percent off, capped at `cap`. Points are clamped to `0..=100`.
    pub fn capped_percentage(points: Decimal, cap: Decimal) -> Self {
        Self::bounded_percentage(points, Some(cap))
    }

    fn bounded_percentage(points: Decimal, cap: Option<Decimal>) -> Self {
        let points = points.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

        Self::Percentage {
            percent: Percentage::from(points / Decimal::ONE_HUNDRED),
            points,
            cap,
        }
    }

    /// Flat `amount` off.
    pub fn fixed(amount: Decimal) -> Self {
        Self::Fixed(amount)
    }

    /// Discount shape.
    pub fn discount_type(&self) -> DiscountType {
        match self {
            Self::Percentage { .. } => DiscountType::Percentage,
            Self::Fixed(_) => DiscountType::Fixed,
        }
    }

    /// Configured value: percentage points or flat amount.
    pub fn value(&self) -> Decimal {
        match self {
            Self::Percentage { points, .. } => *points,
            Self::Fixed(amount) => *amount,
        }
    }

    /// Discount granted against `remaining`.
    pub fn amount_on(&self, remaining: Decimal) -> Decimal {
        match self {
            Self::Percentage { percent, cap, .. } => {
                let discount = *percent * remaining;

                cap.map_or(discount, |cap| discount.min(cap))
            }
            Self::Fixed(amount) => (*amount).min(remaining),
        }
    }
}

// `percent` is derived from `points`, so the configured values decide equality.
impl PartialEq for Discount {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Percentage { points, cap, .. },
                Self::Percentage {
                    points: other_points,
                    cap: other_cap,
                    ..
                },
            ) => points == other_points && cap == other_cap,
            (Self::Fixed(amount), Self::Fixed(other_amount)) => amount == other_amount,
            _ => false,
        }
    }
}

/// A promotion rule as stored in the promotions catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRecord {
    /// Promotion identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Marketing description
    #[serde(default)]
    pub description: String,

    /// `percentage` or `fixed`
    pub discount_type: String,

    /// Percentage points or flat amount
    pub discount_value: Decimal,

    /// Cap for percentage discounts
    #[serde(default)]
    pub max_discount: Option<Decimal>,

    /// Eligibility conditions
    #[serde(default)]
    pub conditions: PromotionConditions,

    /// Start of validity (inclusive)
    pub valid_from: Timestamp,

    /// End of validity (inclusive)
    pub valid_to: Timestamp,

    /// Whether the promotion is switched on
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Whether lower-priority promotions may stack after this one
    #[serde(default)]
    pub is_combinable: bool,

    /// Higher values are applied first
    #[serde(default)]
    pub priority: i32,
}

fn default_active() -> bool {
    true
}

/// A validated promotion rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRule {
    /// Promotion identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Marketing description
    pub description: String,

    /// Discount granted when the rule applies
    pub discount: Discount,

    /// Eligibility conditions
    pub conditions: PromotionConditions,

    /// Start of validity (inclusive)
    pub valid_from: Timestamp,

    /// End of validity (inclusive)
    pub valid_to: Timestamp,

    /// Whether the promotion is switched on
    pub is_active: bool,

    /// Whether lower-priority promotions may stack after this one
    pub is_combinable: bool,

    /// Higher values are applied first
    pub priority: i32,
}

impl PromotionRule {
    /// Create an active, non-combinable, priority zero rule with no conditions.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        discount: Discount,
        valid_from: Timestamp,
        valid_to: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            discount,
            conditions: PromotionConditions::none(),
            valid_from,
            valid_to,
            is_active: true,
            is_combinable: false,
            priority: 0,
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether the rule stacks with lower-priority rules.
    #[must_use]
    pub fn combinable(mut self, is_combinable: bool) -> Self {
        self.is_combinable = is_combinable;
        self
    }

    /// Set the eligibility conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: PromotionConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Switch the rule on or off.
    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Active and `now` within `[valid_from, valid_to]`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active && self.valid_from <= now && now <= self.valid_to
    }

    /// Live and every condition holds.
    pub fn is_eligible(&self, ctx: &EligibilityContext<'_>) -> bool {
        if !self.is_live(ctx.now) {
            debug!(promotion = %self.id, "promotion not live");

            return false;
        }

        match self.conditions.first_unmet(ctx) {
            Some(unmet) => {
                debug!(promotion = %self.id, reason = %unmet, "promotion conditions not met");

                false
            }
            None => true,
        }
    }
}

impl TryFrom<PromotionRecord> for PromotionRule {
    type Error = PromotionError;

    fn try_from(record: PromotionRecord) -> Result<Self, Self::Error> {
        if record.discount_value < Decimal::ZERO {
            return Err(PromotionError::NegativeValue(record.discount_value));
        }

        if record.valid_from > record.valid_to {
            return Err(PromotionError::InvalidWindow {
                from: record.valid_from,
                to: record.valid_to,
            });
        }

        let discount = match record.discount_type.trim().to_ascii_lowercase().as_str() {
            "percentage" if record.discount_value > Decimal::ONE_HUNDRED => {
                return Err(PromotionError::PercentageOutOfRange(record.discount_value));
            }
            "percentage" => match record.max_discount {
                Some(cap) if cap < Decimal::ZERO => {
                    return Err(PromotionError::NegativeValue(cap));
                }
                Some(cap) => Discount::capped_percentage(record.discount_value, cap),
                None => Discount::percentage(record.discount_value),
            },
            "fixed" => Discount::fixed(record.discount_value),
            _ => return Err(PromotionError::UnknownDiscountType(record.discount_type)),
        };

        Ok(Self {
            id: record.id,
            name: record.name,
            description: record.description,
            discount,
            conditions: record.conditions,
            valid_from: record.valid_from,
            valid_to: record.valid_to,
            is_active: record.is_active,
            is_combinable: record.is_combinable,
            priority: record.priority,
        })
    }
}

/// Eligible rules ordered by priority, highest first.
///
/// Equal priorities keep their catalog order.
pub fn eligible_promotions<'a>(
    promotions: &'a [PromotionRule],
    ctx: &EligibilityContext<'_>,
) -> Vec<&'a PromotionRule> {
    let mut eligible: Vec<&PromotionRule> = promotions
        .iter()
        .filter(|promotion| promotion.is_eligible(ctx))
        .collect();

    eligible.sort_by(|a, b| b.priority.cmp(&a.priority));

    eligible
}
