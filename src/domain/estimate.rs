//! Price estimate types
//!
//! Money is carried as [`Decimal`] rounded to cents at every step, and
//! serialized as a JSON number.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::specs::PrintOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMethod {
    Digital,
    Offset,
}

impl fmt::Display for PrintMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digital => f.write_str("digital"),
            Self::Offset => f.write_str("offset"),
        }
    }
}

/// Itemized cost components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub material_cost: Decimal,
    pub print_cost: Decimal,
    pub setup_cost: Decimal,
    pub finishing_cost: Decimal,
    pub option_costs: BTreeMap<PrintOption, Decimal>,
    pub rush_fee: Decimal,
    /// Zero or negative
    pub quantity_discount: Decimal,
    pub margin_amount: Decimal,
    pub margin_percent: u32,
}

/// Complete price estimate for one specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub print_method: PrintMethod,
    pub print_method_reason: String,
    pub breakdown: PricingBreakdown,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub estimate_notes: Vec<String>,
}
