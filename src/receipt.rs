//! Receipt
//!
//! The priced breakdown returned by the engine, and its itemised rendering.

use std::{fmt, io};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Alignment, Style, Theme, object::Columns},
};
use thiserror::Error;

use crate::promotions::DiscountType;

/// Errors that can occur while rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A promotion that contributed to the discount.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromotion {
    /// Promotion identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Discount shape
    pub discount_type: DiscountType,

    /// Percentage points or flat amount, as configured
    pub value: Decimal,

    /// Discount actually granted, in the breakdown currency
    pub discount_amount: Money<'static, Currency>,
}

/// Itemised price of a booking in a single currency.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingBreakdown {
    pub(crate) base_cruise_fare: Money<'static, Currency>,
    pub(crate) cabin_upgrade: Money<'static, Currency>,
    pub(crate) extras_total: Money<'static, Currency>,
    pub(crate) subtotal: Money<'static, Currency>,
    pub(crate) tax_amount: Money<'static, Currency>,
    pub(crate) gratuity_amount: Money<'static, Currency>,
    pub(crate) discount_amount: Money<'static, Currency>,
    pub(crate) final_total: Money<'static, Currency>,
    pub(crate) currency: &'static Currency,
    pub(crate) applied_promotions: Vec<AppliedPromotion>,
}

impl PricingBreakdown {
    /// `base_price × guest_count`
    pub fn base_cruise_fare(&self) -> Money<'static, Currency> {
        self.base_cruise_fare
    }

    /// Cabin upgrade over the base cabin; negative for cheaper cabins.
    pub fn cabin_upgrade(&self) -> Money<'static, Currency> {
        self.cabin_upgrade
    }

    /// Sum of all extras
    pub fn extras_total(&self) -> Money<'static, Currency> {
        self.extras_total
    }

    /// Fare, upgrade and extras before tax and gratuity
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Tax on the subtotal
    pub fn tax_amount(&self) -> Money<'static, Currency> {
        self.tax_amount
    }

    /// Gratuity on the subtotal
    pub fn gratuity_amount(&self) -> Money<'static, Currency> {
        self.gratuity_amount
    }

    /// Total discount granted
    pub fn discount_amount(&self) -> Money<'static, Currency> {
        self.discount_amount
    }

    /// Amount to charge, never negative
    pub fn final_total(&self) -> Money<'static, Currency> {
        self.final_total
    }

    /// Currency of every amount in the breakdown
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Promotions applied, in application order
    pub fn applied_promotions(&self) -> &[AppliedPromotion] {
        &self.applied_promotions
    }

    /// Subtotal plus tax and gratuity, from the rounded parts.
    pub fn total_before_discounts(&self) -> Money<'static, Currency> {
        Money::from_decimal(
            self.subtotal
                .amount()
                .saturating_add(*self.tax_amount.amount())
                .saturating_add(*self.gratuity_amount.amount()),
            self.currency,
        )
    }

    /// Render the breakdown as an itemised table.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Io`] if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut records = vec![row(
            "Item",
            format!("Amount ({})", self.currency.iso_alpha_code),
        )];

        // A separator sits above each section: charges, subtotal, discounts, total.
        let mut separators = Vec::with_capacity(4);

        separators.push(records.len());
        records.push(row("Cruise fare", self.base_cruise_fare));
        records.push(row("Cabin upgrade", self.cabin_upgrade));
        records.push(row("Extras", self.extras_total));

        separators.push(records.len());
        records.push(row("Subtotal", self.subtotal));
        records.push(row("Tax", self.tax_amount));
        records.push(row("Gratuity", self.gratuity_amount));

        if !self.applied_promotions.is_empty() {
            separators.push(records.len());
            records.extend(self.applied_promotions.iter().map(|promotion| {
                row(
                    &promotion_label(promotion),
                    format!("-{}", promotion.discount_amount),
                )
            }));
        }

        separators.push(records.len());
        records.push(row("Total", self.final_total));

        let mut builder = Builder::default();

        for record in records {
            builder.push_record(record);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.remove_horizontal_lines();

        for line in separators {
            theme.insert_horizontal_line(line, separator);
        }

        table.with(theme);
        table.modify(Columns::new(1..2), Alignment::right());

        writeln!(out, "{table}")?;

        Ok(())
    }
}

fn row(label: &str, amount: impl fmt::Display) -> [String; 2] {
    [label.to_string(), amount.to_string()]
}

fn promotion_label(promotion: &AppliedPromotion) -> String {
    match promotion.discount_type {
        DiscountType::Percentage => format!("{} ({}% off)", promotion.name, promotion.value),
        DiscountType::Fixed => format!("{} ({} off)", promotion.name, promotion.value),
    }
}
