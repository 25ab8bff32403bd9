//! Promotion Eligibility Conditions
//!
//! A conjunction of optional predicates. Absent fields (and empty lists) are
//! vacuously satisfied.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::booking::BookingContext;

/// What conditions are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityContext<'a> {
    /// Booking facts
    pub booking: &'a BookingContext,

    /// Pre-tax, pre-gratuity subtotal in the reference currency
    pub subtotal: Decimal,

    /// Evaluation instant
    pub now: Timestamp,
}

/// Eligibility conditions attached to a promotion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromotionConditions {
    /// Minimum total guests
    pub min_guests: Option<u32>,

    /// Maximum total guests
    pub max_guests: Option<u32>,

    /// Minimum subtotal
    pub min_booking_amount: Option<Decimal>,

    /// Maximum subtotal
    pub max_booking_amount: Option<Decimal>,

    /// Early booking: at least this many days before departure
    pub early_booking_days: Option<i64>,

    /// Last minute: at most this many days before departure
    pub last_minute_days: Option<i64>,

    /// Minimum party size for group offers
    pub min_group_size: Option<u32>,

    /// Allowed cruise lines
    pub cruise_lines: Vec<String>,

    /// Allowed destinations
    pub destinations: Vec<String>,

    /// Allowed cabin types
    pub cabin_types: Vec<String>,

    /// Minimum number of seniors
    pub min_seniors: Option<u32>,

    /// Maximum number of children
    pub max_children: Option<u32>,
}

/// The first condition a booking failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmetCondition {
    /// Too few guests.
    MinGuests {
        /// Required
        required: u32,
        /// Actual
        actual: u32,
    },

    /// Too many guests.
    MaxGuests {
        /// Allowed
        allowed: u32,
        /// Actual
        actual: u32,
    },

    /// Subtotal below the threshold.
    MinBookingAmount {
        /// Required
        required: Decimal,
        /// Actual
        actual: Decimal,
    },

    /// Subtotal above the threshold.
    MaxBookingAmount {
        /// Allowed
        allowed: Decimal,
        /// Actual
        actual: Decimal,
    },

    /// Booked too close to departure.
    EarlyBooking {
        /// Required days before departure
        required_days: i64,
        /// Actual days before departure
        days_until_departure: i64,
    },

    /// Booked too far ahead of departure.
    LastMinute {
        /// Allowed days before departure
        allowed_days: i64,
        /// Actual days before departure
        days_until_departure: i64,
    },

    /// Party too small for a group offer.
    MinGroupSize {
        /// Required
        required: u32,
        /// Actual
        actual: u32,
    },

    /// Cruise line not in the allowed list.
    CruiseLine(String),

    /// Destination not in the allowed list.
    Destination(String),

    /// Cabin type not in the allowed list.
    CabinType(String),

    /// Too few seniors.
    MinSeniors {
        /// Required
        required: u32,
        /// Actual
        actual: u32,
    },

    /// Too many children.
    MaxChildren {
        /// Allowed
        allowed: u32,
        /// Actual
        actual: u32,
    },
}

impl fmt::Display for UnmetCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinGuests { required, actual } => {
                write!(f, "needs at least {required} guests, booking has {actual}")
            }
            Self::MaxGuests { allowed, actual } => {
                write!(f, "allows at most {allowed} guests, booking has {actual}")
            }
            Self::MinBookingAmount { required, actual } => {
                write!(f, "needs a subtotal of at least {required}, got {actual}")
            }
            Self::MaxBookingAmount { allowed, actual } => {
                write!(f, "allows a subtotal of at most {allowed}, got {actual}")
            }
            Self::EarlyBooking {
                required_days,
                days_until_departure,
            } => write!(
                f,
                "needs booking {required_days}+ days ahead, departure is in {days_until_departure}"
            ),
            Self::LastMinute {
                allowed_days,
                days_until_departure,
            } => write!(
                f,
                "needs departure within {allowed_days} days, departure is in {days_until_departure}"
            ),
            Self::MinGroupSize { required, actual } => {
                write!(f, "needs a group of {required}, booking has {actual}")
            }
            Self::CruiseLine(line) => write!(f, "cruise line {line:?} not eligible"),
            Self::Destination(destination) => {
                write!(f, "destination {destination:?} not eligible")
            }
            Self::CabinType(cabin) => write!(f, "cabin type {cabin:?} not eligible"),
            Self::MinSeniors { required, actual } => {
                write!(f, "needs at least {required} seniors, booking has {actual}")
            }
            Self::MaxChildren { allowed, actual } => {
                write!(f, "allows at most {allowed} children, booking has {actual}")
            }
        }
    }
}

impl PromotionConditions {
    /// No constraints at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether every specified condition holds.
    pub fn is_satisfied(&self, ctx: &EligibilityContext<'_>) -> bool {
        self.first_unmet(ctx).is_none()
    }

    /// The first condition that does not hold, if any.
    pub fn first_unmet(&self, ctx: &EligibilityContext<'_>) -> Option<UnmetCondition> {
        let booking = ctx.booking;

        if let Some(required) = self.min_guests
            && booking.guest_count < required
        {
            return Some(UnmetCondition::MinGuests {
                required,
                actual: booking.guest_count,
            });
        }

        if let Some(allowed) = self.max_guests
            && booking.guest_count > allowed
        {
            return Some(UnmetCondition::MaxGuests {
                allowed,
                actual: booking.guest_count,
            });
        }

        if let Some(required) = self.min_booking_amount
            && ctx.subtotal < required
        {
            return Some(UnmetCondition::MinBookingAmount {
                required,
                actual: ctx.subtotal,
            });
        }

        if let Some(allowed) = self.max_booking_amount
            && ctx.subtotal > allowed
        {
            return Some(UnmetCondition::MaxBookingAmount {
                allowed,
                actual: ctx.subtotal,
            });
        }

        if let Some(unmet) = self.departure_window_unmet(ctx) {
            return Some(unmet);
        }

        if let Some(required) = self.min_group_size
            && booking.guest_count < required
        {
            return Some(UnmetCondition::MinGroupSize {
                required,
                actual: booking.guest_count,
            });
        }

        if !allows(&self.cruise_lines, &booking.cruise_line) {
            return Some(UnmetCondition::CruiseLine(booking.cruise_line.clone()));
        }

        if !allows(&self.destinations, &booking.destination) {
            return Some(UnmetCondition::Destination(booking.destination.clone()));
        }

        if !allows(&self.cabin_types, &booking.cabin_type) {
            return Some(UnmetCondition::CabinType(booking.cabin_type.clone()));
        }

        if let Some(required) = self.min_seniors
            && booking.senior_count < required
        {
            return Some(UnmetCondition::MinSeniors {
                required,
                actual: booking.senior_count,
            });
        }

        if let Some(allowed) = self.max_children
            && booking.child_count > allowed
        {
            return Some(UnmetCondition::MaxChildren {
                allowed,
                actual: booking.child_count,
            });
        }

        None
    }

    fn departure_window_unmet(&self, ctx: &EligibilityContext<'_>) -> Option<UnmetCondition> {
        if self.early_booking_days.is_none() && self.last_minute_days.is_none() {
            return None;
        }

        let days_until_departure = ctx.booking.days_until_departure(ctx.now);

        if let Some(required_days) = self.early_booking_days
            && days_until_departure < required_days
        {
            return Some(UnmetCondition::EarlyBooking {
                required_days,
                days_until_departure,
            });
        }

        if let Some(allowed_days) = self.last_minute_days
            && days_until_departure > allowed_days
        {
            return Some(UnmetCondition::LastMinute {
                allowed_days,
                days_until_departure,
            });
        }

        None
    }
}

/// Empty allow-lists admit everything.
fn allows(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|candidate| candidate == value)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    fn booking() -> Result<BookingContext, jiff::Error> {
        Ok(BookingContext {
            guest_count: 4,
            child_count: 1,
            senior_count: 2,
            cruise_line: "Aurora Lines".to_string(),
            destination: "Caribbean".to_string(),
            cabin_type: "balcony".to_string(),
            departure_date: "2026-06-30T00:00:00Z".parse()?,
        })
    }

    fn ctx(booking: &BookingContext) -> Result<EligibilityContext<'_>, jiff::Error> {
        Ok(EligibilityContext {
            booking,
            subtotal: dec!(2400),
            now: "2026-04-01T00:00:00Z".parse()?,
        })
    }

    #[test]
    fn empty_conditions_are_satisfied() -> TestResult {
        let booking = booking()?;

        assert!(PromotionConditions::none().is_satisfied(&ctx(&booking)?));

        Ok(())
    }

    #[test]
    fn all_matching_conditions_are_satisfied() -> TestResult {
        let booking = booking()?;
        let conditions = PromotionConditions {
            min_guests: Some(2),
            max_guests: Some(6),
            min_booking_amount: Some(dec!(2000)),
            max_booking_amount: Some(dec!(2400)),
            early_booking_days: Some(90),
            min_group_size: Some(4),
            cruise_lines: vec!["Aurora Lines".to_string(), "Polar Star".to_string()],
            destinations: vec!["Caribbean".to_string()],
            cabin_types: vec!["balcony".to_string(), "suite".to_string()],
            min_seniors: Some(2),
            max_children: Some(1),
            ..PromotionConditions::default()
        };

        assert_eq!(conditions.first_unmet(&ctx(&booking)?), None);

        Ok(())
    }

    #[test]
    fn any_failing_condition_disqualifies() -> TestResult {
        let booking = booking()?;
        let ctx = ctx(&booking)?;

        let cases = [
            (
                PromotionConditions {
                    min_guests: Some(5),
                    ..PromotionConditions::default()
                },
                UnmetCondition::MinGuests {
                    required: 5,
                    actual: 4,
                },
            ),
            (
                PromotionConditions {
                    max_booking_amount: Some(dec!(2399.99)),
                    ..PromotionConditions::default()
                },
                UnmetCondition::MaxBookingAmount {
                    allowed: dec!(2399.99),
                    actual: dec!(2400),
                },
            ),
            (
                PromotionConditions {
                    destinations: vec!["Alaska".to_string()],
                    ..PromotionConditions::default()
                },
                UnmetCondition::Destination("Caribbean".to_string()),
            ),
            (
                PromotionConditions {
                    max_children: Some(0),
                    ..PromotionConditions::default()
                },
                UnmetCondition::MaxChildren {
                    allowed: 0,
                    actual: 1,
                },
            ),
        ];

        for (conditions, expected) in cases {
            assert_eq!(
                conditions.first_unmet(&ctx),
                Some(expected.clone()),
                "expected {expected}"
            );
            assert!(!conditions.is_satisfied(&ctx), "expected {expected}");
        }

        Ok(())
    }

    #[test]
    fn early_booking_requires_days_at_or_above_threshold() -> TestResult {
        let booking = booking()?;
        let ctx = ctx(&booking)?;

        // 2026-04-01 -> 2026-06-30 is 90 days.
        let at_threshold = PromotionConditions {
            early_booking_days: Some(90),
            ..PromotionConditions::default()
        };

        let above_threshold = PromotionConditions {
            early_booking_days: Some(91),
            ..PromotionConditions::default()
        };

        assert!(at_threshold.is_satisfied(&ctx));
        assert_eq!(
            above_threshold.first_unmet(&ctx),
            Some(UnmetCondition::EarlyBooking {
                required_days: 91,
                days_until_departure: 90,
            })
        );

        Ok(())
    }

    #[test]
    fn last_minute_requires_days_at_or_below_threshold() -> TestResult {
        let booking = booking()?;
        let ctx = ctx(&booking)?;

        let within = PromotionConditions {
            last_minute_days: Some(90),
            ..PromotionConditions::default()
        };

        let too_early = PromotionConditions {
            last_minute_days: Some(30),
            ..PromotionConditions::default()
        };

        assert!(within.is_satisfied(&ctx));
        assert!(matches!(
            too_early.first_unmet(&ctx),
            Some(UnmetCondition::LastMinute {
                allowed_days: 30,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn conditions_deserialise_with_missing_fields() -> TestResult {
        let yaml = r"
minGuests: 2
cabinTypes: [suite]
minBookingAmount: 1500
";
        let conditions: PromotionConditions = serde_norway::from_str(yaml)?;

        assert_eq!(conditions.min_guests, Some(2));
        assert_eq!(conditions.cabin_types, vec!["suite".to_string()]);
        assert_eq!(conditions.min_booking_amount, Some(dec!(1500)));
        assert_eq!(conditions.max_guests, None);
        assert!(conditions.cruise_lines.is_empty());

        Ok(())
    }

    #[test]
    fn unmet_condition_describes_failure() {
        let unmet = UnmetCondition::CabinType("inside".to_string());

        assert_eq!(unmet.to_string(), "cabin type \"inside\" not eligible");
    }
}
