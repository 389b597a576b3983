//! Rate card: the versioned pricing and catalog table.
//!
//! Holds every price, threshold and policy value the pipeline consults.
//! A card is loaded once, checked, and then only ever read; reloading swaps
//! the whole card behind [`RateCardStore`] so a request never sees a mix of
//! old and new prices.

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{PrintMethod, PrintOption, ProductType};

/// Card shipped with the binary, used when no file is deployed.
const BUILTIN_RATE_CARD: &str = include_str!("../../data/rate_card.json");

/// Scale that configured rates are normalized to after decoding.
const RATE_SCALE: u32 = 6;

#[derive(Debug, Error)]
pub enum RateCardError {
    #[error("failed to read rate card at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rate card is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("rate card is inconsistent: {0}")]
    Invalid(String),
}

// ============================================================================
// Card structure
// ============================================================================

/// A price per print method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRates {
    pub digital: Decimal,
    pub offset: Decimal,
}

impl MethodRates {
    pub fn for_method(&self, method: PrintMethod) -> Decimal {
        match method {
            PrintMethod::Digital => self.digital,
            PrintMethod::Offset => self.offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRates {
    pub material_per_unit: Decimal,
    pub print_per_unit: MethodRates,
    #[serde(default)]
    pub standard_sizes: Vec<String>,
    #[serde(default = "default_minimum_quantity")]
    pub minimum_quantity: u32,
    pub maximum_quantity: u32,
    /// Overrides `default_offset_threshold` for this product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_threshold: Option<u32>,
}

fn default_minimum_quantity() -> u32 {
    1
}

/// Flat finishing fee, higher for large orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishingTiers {
    pub threshold_quantity: u32,
    pub standard_fee: Decimal,
    pub large_order_fee: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRate {
    #[serde(default)]
    pub flat_fee: Decimal,
    #[serde(default)]
    pub per_unit_fee: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub min_quantity: u32,
    pub rate: Decimal,
}

/// Policy values read by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Shorter content is not a real request.
    pub min_content_length: usize,
    /// Artwork below this resolution cannot be printed.
    pub dpi_floor: u32,
    pub dpi_recommended: u32,
    /// Turnarounds of this many days or fewer count as rush.
    pub rush_window_days: u32,
    /// Options that cannot be produced inside the rush window.
    pub lead_time_options: Vec<PrintOption>,
    pub volume_notice_quantity: u32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_content_length: 10,
            dpi_floor: 200,
            dpi_recommended: 300,
            rush_window_days: 2,
            lead_time_options: vec![
                PrintOption::FoilStamping,
                PrintOption::Embossing,
                PrintOption::DieCut,
            ],
            volume_notice_quantity: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCard {
    pub version: String,
    pub currency: String,
    pub products: BTreeMap<ProductType, ProductRates>,
    /// Pricing row for products missing from `products`.
    pub default_product: ProductRates,
    pub default_offset_threshold: u32,
    pub setup_costs: MethodRates,
    pub double_sided_multiplier: Decimal,
    pub finishing: FinishingTiers,
    pub options: BTreeMap<PrintOption, OptionRate>,
    pub quantity_discounts: Vec<DiscountTier>,
    pub rush_fee_rate: Decimal,
    pub margin_percent: u32,
    pub tax_rate: Decimal,
    pub minimum_order_value: Decimal,
    #[serde(default)]
    pub validation: ValidationRules,
}

// ============================================================================
// Loading
// ============================================================================

impl RateCard {
    /// Parse, normalize and check a card.
    pub fn from_json(json: &str) -> Result<Self, RateCardError> {
        let mut card: RateCard = serde_json::from_str(json)?;
        card.normalize();
        card.check()?;
        Ok(card)
    }

    pub fn builtin() -> Result<Self, RateCardError> {
        Self::from_json(BUILTIN_RATE_CARD)
    }

    pub fn load(path: &Path) -> Result<Self, RateCardError> {
        let json = std::fs::read_to_string(path).map_err(|source| RateCardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `path`, falling back to the built-in card only when the file
    /// does not exist. A present but broken file is an error.
    pub fn load_or_builtin(path: &Path) -> Result<Self, RateCardError> {
        match Self::load(path) {
            Err(RateCardError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::warn!(path = %path.display(), "Rate card file not found, using built-in card");
                Self::builtin()
            }
            other => other,
        }
    }

    fn normalize(&mut self) {
        let rows = self
            .products
            .values_mut()
            .chain(std::iter::once(&mut self.default_product));
        for row in rows {
            normalize_rate(&mut row.material_per_unit);
            normalize_rate(&mut row.print_per_unit.digital);
            normalize_rate(&mut row.print_per_unit.offset);
        }
        for rate in self.options.values_mut() {
            normalize_rate(&mut rate.flat_fee);
            normalize_rate(&mut rate.per_unit_fee);
        }
        for tier in &mut self.quantity_discounts {
            normalize_rate(&mut tier.rate);
        }
        normalize_rate(&mut self.setup_costs.digital);
        normalize_rate(&mut self.setup_costs.offset);
        normalize_rate(&mut self.double_sided_multiplier);
        normalize_rate(&mut self.finishing.standard_fee);
        normalize_rate(&mut self.finishing.large_order_fee);
        normalize_rate(&mut self.rush_fee_rate);
        normalize_rate(&mut self.tax_rate);
        normalize_rate(&mut self.minimum_order_value);
    }

    fn check(&self) -> Result<(), RateCardError> {
        let invalid = |msg: String| Err(RateCardError::Invalid(msg));

        if self.setup_costs.offset <= self.setup_costs.digital {
            return invalid("offset setup cost must exceed digital setup cost".to_string());
        }

        for pair in self.quantity_discounts.windows(2) {
            if pair[1].min_quantity <= pair[0].min_quantity {
                return invalid(format!(
                    "discount breakpoints must be ascending ({} follows {})",
                    pair[1].min_quantity, pair[0].min_quantity
                ));
            }
            if pair[1].rate < pair[0].rate {
                return invalid(format!(
                    "discount rate at {} is lower than the previous tier",
                    pair[1].min_quantity
                ));
            }
        }
        if let Some(tier) = self
            .quantity_discounts
            .iter()
            .find(|t| t.rate < Decimal::ZERO || t.rate > Decimal::ONE)
        {
            return invalid(format!(
                "discount rate at {} must be between 0 and 1",
                tier.min_quantity
            ));
        }

        let non_negative = [
            ("rush_fee_rate", self.rush_fee_rate),
            ("tax_rate", self.tax_rate),
            ("minimum_order_value", self.minimum_order_value),
            ("finishing.standard_fee", self.finishing.standard_fee),
            ("finishing.large_order_fee", self.finishing.large_order_fee),
        ];
        if let Some((name, _)) = non_negative.iter().find(|(_, v)| *v < Decimal::ZERO) {
            return invalid(format!("{name} must not be negative"));
        }

        if self.double_sided_multiplier < Decimal::ONE {
            return invalid("double_sided_multiplier must be at least 1".to_string());
        }

        if self.validation.dpi_floor > self.validation.dpi_recommended {
            return invalid("dpi_floor must not exceed dpi_recommended".to_string());
        }

        for product in ProductType::ALL {
            if self.product_rates(product).is_none() {
                tracing::warn!(
                    product_type = %product,
                    version = %self.version,
                    "Rate card has no row for product, default rates will apply"
                );
            }
        }

        Ok(())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn product_rates(&self, product: ProductType) -> Option<&ProductRates> {
        self.products.get(&product)
    }

    /// Quantity at or above which offset printing is used.
    pub fn offset_threshold(&self, product: ProductType) -> u32 {
        self.product_rates(product)
            .and_then(|rates| rates.offset_threshold)
            .unwrap_or(self.default_offset_threshold)
    }

    /// Rate of the highest breakpoint not above `quantity`, zero below the
    /// first one.
    pub fn discount_rate(&self, quantity: u32) -> Decimal {
        self.quantity_discounts
            .iter()
            .rev()
            .find(|tier| quantity >= tier.min_quantity)
            .map(|tier| tier.rate)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn option_rate(&self, option: PrintOption) -> Option<&OptionRate> {
        self.options.get(&option)
    }
}

fn normalize_rate(value: &mut Decimal) {
    *value = value.round_dp(RATE_SCALE).normalize();
}

// ============================================================================
// Store
// ============================================================================

/// Shared handle to the active rate card.
#[derive(Clone)]
pub struct RateCardStore {
    inner: Arc<RwLock<Arc<RateCard>>>,
}

impl RateCardStore {
    pub fn new(card: RateCard) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(card))),
        }
    }

    /// The card a request should use from start to finish.
    pub fn snapshot(&self) -> Arc<RateCard> {
        self.inner.read().clone()
    }

    /// Swap in a new card, returning the one it replaced.
    pub fn replace(&self, card: RateCard) -> Arc<RateCard> {
        let card = Arc::new(card);
        std::mem::replace(&mut *self.inner.write(), card)
    }

    /// Load a card from disk and swap it in. On error the active card is
    /// left untouched.
    pub fn reload_from(&self, path: &Path) -> Result<Arc<RateCard>, RateCardError> {
        let card = RateCard::load(path)?;
        let version = card.version.clone();
        let previous = self.replace(card);
        tracing::info!(
            previous_version = %previous.version,
            version = %version,
            "Rate card reloaded"
        );
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn builtin_json() -> serde_json::Value {
        serde_json::from_str(BUILTIN_RATE_CARD).unwrap()
    }

    #[test]
    fn builtin_card_loads_and_covers_the_catalog() {
        let card = RateCard::builtin().unwrap();

        assert_eq!(card.currency, "USD");
        for product in ProductType::ALL {
            assert!(card.product_rates(product).is_some(), "{product} has no rates");
        }
        assert_eq!(card.offset_threshold(ProductType::Posters), 250);
        assert_eq!(card.offset_threshold(ProductType::BusinessCards), 500);
        assert_eq!(card.margin_percent, 30);
        assert_eq!(card.minimum_order_value, Decimal::new(1500, 2));
    }

    #[test]
    fn discount_breakpoints_resolve_to_the_higher_tier() {
        let card = RateCard::builtin().unwrap();

        assert_eq!(card.discount_rate(0), Decimal::ZERO);
        assert_eq!(card.discount_rate(249), Decimal::ZERO);
        assert_eq!(card.discount_rate(250), Decimal::new(5, 2));
        assert_eq!(card.discount_rate(499), Decimal::new(5, 2));
        assert_eq!(card.discount_rate(500), Decimal::new(10, 2));
        assert_eq!(card.discount_rate(1000), Decimal::new(15, 2));
        assert_eq!(card.discount_rate(5000), Decimal::new(20, 2));
        assert_eq!(card.discount_rate(10000), Decimal::new(25, 2));
        assert_eq!(card.discount_rate(u32::MAX), Decimal::new(25, 2));
    }

    #[test]
    fn discount_rate_never_decreases() {
        let card = RateCard::builtin().unwrap();
        let mut previous = Decimal::ZERO;
        for quantity in (0..=20_000).step_by(7) {
            let rate = card.discount_rate(quantity);
            assert!(rate >= previous, "rate dropped at {quantity}");
            previous = rate;
        }
    }

    #[test]
    fn rates_are_exact_after_decoding() {
        let card = RateCard::builtin().unwrap();
        let cards = card.product_rates(ProductType::BusinessCards).unwrap();
        assert_eq!(cards.material_per_unit, Decimal::new(2, 2));
        assert_eq!(cards.print_per_unit.offset, Decimal::new(3, 2));
        assert_eq!(card.rush_fee_rate, Decimal::new(30, 2));
    }

    #[test]
    fn rejects_descending_breakpoints() {
        let mut json = builtin_json();
        json["quantity_discounts"] = serde_json::json!([
            { "min_quantity": 500, "rate": 0.10 },
            { "min_quantity": 250, "rate": 0.05 }
        ]);

        let err = RateCard::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, RateCardError::Invalid(_)));
    }

    #[test]
    fn rejects_offset_setup_not_above_digital() {
        let mut json = builtin_json();
        json["setup_costs"] = serde_json::json!({ "digital": 50.0, "offset": 50.0 });

        let err = RateCard::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("offset setup cost"));
    }

    #[test]
    fn validation_section_is_optional() {
        let mut json = builtin_json();
        json.as_object_mut().unwrap().remove("validation");

        let card = RateCard::from_json(&json.to_string()).unwrap();
        assert_eq!(card.validation, ValidationRules::default());
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let card = RateCard::load_or_builtin(&dir.path().join("absent.json")).unwrap();
        assert_eq!(card, RateCard::builtin().unwrap());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = RateCard::load_or_builtin(file.path()).unwrap_err();
        assert!(matches!(err, RateCardError::Parse(_)));
    }

    #[test]
    fn snapshots_survive_a_reload() {
        let store = RateCardStore::new(RateCard::builtin().unwrap());
        let before = store.snapshot();

        let mut json = builtin_json();
        json["version"] = serde_json::json!("next");
        json["margin_percent"] = serde_json::json!(25);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{json}").unwrap();

        let after = store.reload_from(file.path()).unwrap();

        assert_eq!(before.version, "2026.10.1");
        assert_eq!(before.margin_percent, 30);
        assert_eq!(after.version, "next");
        assert_eq!(store.snapshot().margin_percent, 25);
    }

    #[test]
    fn failed_reload_keeps_the_active_card() {
        let store = RateCardStore::new(RateCard::builtin().unwrap());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();

        assert!(store.reload_from(file.path()).is_err());
        assert_eq!(store.snapshot().version, "2026.10.1");
    }
}
