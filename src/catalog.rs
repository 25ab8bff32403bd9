//! Promotion Catalog
//!
//! Loads promotion rules from YAML. Rules that cannot be turned into a
//! [`PromotionRule`] are logged and skipped; they never fail the whole catalog.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::promotions::{PromotionRecord, PromotionRule};

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read promotion catalog: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    promotions: Vec<serde_norway::Value>,
}

/// Ordered set of promotion rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionCatalog {
    promotions: Vec<PromotionRule>,
}

impl PromotionCatalog {
    /// Create a catalog from already-built rules.
    pub fn new(promotions: Vec<PromotionRule>) -> Self {
        Self { promotions }
    }

    /// Parse a `{ promotions: [...] }` YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Yaml`] if the document itself is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_norway::from_str(yaml)?;
        let mut promotions = Vec::with_capacity(file.promotions.len());

        for (index, value) in file.promotions.into_iter().enumerate() {
            let record: PromotionRecord = match serde_norway::from_value(value) {
                Ok(record) => record,
                Err(error) => {
                    warn!(index, %error, "skipping unreadable promotion");

                    continue;
                }
            };

            let id = record.id.clone();

            match PromotionRule::try_from(record) {
                Ok(rule) => promotions.push(rule),
                Err(error) => warn!(promotion = %id, %error, "skipping invalid promotion"),
            }
        }

        debug!(count = promotions.len(), "loaded promotion catalog");

        Ok(Self { promotions })
    }

    /// Load a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or any error
    /// from [`PromotionCatalog::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Rules in catalog order
    pub fn promotions(&self) -> &[PromotionRule] {
        &self.promotions
    }

    /// Look up a rule by identifier.
    pub fn get(&self, id: &str) -> Option<&PromotionRule> {
        self.promotions.iter().find(|promotion| promotion.id == id)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Whether the catalog has no rules
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }
}

impl From<PromotionCatalog> for Vec<PromotionRule> {
    fn from(catalog: PromotionCatalog) -> Self {
        catalog.promotions
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::promotions::{Discount, DiscountType};

    use super::*;

    const CATALOG: &str = r#"
promotions:
  - id: early-bird
    name: Early Bird
    discountType: percentage
    discountValue: 10
    maxDiscount: 300
    validFrom: "2026-01-01T00:00:00Z"
    validTo: "2026-12-31T23:59:59Z"
    isCombinable: true
    priority: 10
    conditions:
      earlyBookingDays: 60
  - id: broken-type
    name: Broken
    discountType: bogus
    discountValue: 5
    validFrom: "2026-01-01T00:00:00Z"
    validTo: "2026-12-31T23:59:59Z"
  - id: onboard-credit
    name: Onboard Credit
    discountType: fixed
    discountValue: 50
    maxDiscount: 10
    validFrom: "2026-01-01T00:00:00Z"
    validTo: "2026-12-31T23:59:59Z"
  - id: backwards
    name: Backwards
    discountType: fixed
    discountValue: 50
    validFrom: "2026-12-31T00:00:00Z"
    validTo: "2026-01-01T00:00:00Z"
  - id: not-a-number
    name: Unreadable
    discountType: fixed
    discountValue: lots
    validFrom: "2026-01-01T00:00:00Z"
    validTo: "2026-12-31T23:59:59Z"
"#;

    #[test]
    fn loads_valid_rules_in_order_and_skips_invalid_ones() -> TestResult {
        let catalog = PromotionCatalog::from_yaml_str(CATALOG)?;

        let ids: Vec<&str> = catalog.promotions().iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, ["early-bird", "onboard-credit"]);
        assert_eq!(catalog.len(), 2);

        Ok(())
    }

    #[test]
    fn parses_discount_and_conditions() -> TestResult {
        let catalog = PromotionCatalog::from_yaml_str(CATALOG)?;

        let early_bird = catalog.get("early-bird").ok_or("early-bird missing")?;

        assert_eq!(
            early_bird.discount,
            Discount::capped_percentage(dec!(10), dec!(300))
        );
        assert_eq!(early_bird.conditions.early_booking_days, Some(60));
        assert_eq!(early_bird.priority, 10);
        assert!(early_bird.is_combinable);
        assert!(early_bird.is_active);

        let credit = catalog.get("onboard-credit").ok_or("onboard-credit missing")?;

        assert_eq!(credit.discount.discount_type(), DiscountType::Fixed);
        assert_eq!(credit.discount, Discount::fixed(dec!(50)));
        assert!(!credit.is_combinable);

        Ok(())
    }

    #[test]
    fn empty_document_yields_empty_catalog() -> TestResult {
        let catalog = PromotionCatalog::from_yaml_str("promotions: []")?;

        assert!(catalog.is_empty());
        assert!(catalog.get("anything").is_none());

        Ok(())
    }

    #[test]
    fn malformed_document_is_an_error() {
        let result = PromotionCatalog::from_yaml_str("promotions: {");

        assert!(matches!(result, Err(CatalogError::Yaml(_))));
    }

    #[test]
    fn load_reads_catalog_from_disk() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("promotions.yml");

        fs::write(&path, CATALOG)?;

        let catalog = PromotionCatalog::load(&path)?;

        assert_eq!(catalog.len(), 2);

        let rules: Vec<PromotionRule> = catalog.into();

        assert_eq!(rules.len(), 2);

        Ok(())
    }

    #[test]
    fn load_reports_missing_file() {
        let result = PromotionCatalog::load("./does-not-exist/promotions.yml");

        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
