//! Print specification domain types
//!
//! The structured record produced by the extractor and read by the
//! validator and the pricing engine. Every field except `raw_input` holds a
//! value from a closed domain.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Product catalog
// ============================================================================

/// Products the shop knows how to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    BusinessCards,
    Flyers,
    Brochures,
    Posters,
    Banners,
    Postcards,
    Letterheads,
    Envelopes,
    Booklets,
    Catalogs,
}

impl ProductType {
    pub const ALL: [ProductType; 10] = [
        Self::BusinessCards,
        Self::Flyers,
        Self::Brochures,
        Self::Posters,
        Self::Banners,
        Self::Postcards,
        Self::Letterheads,
        Self::Envelopes,
        Self::Booklets,
        Self::Catalogs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessCards => "business_cards",
            Self::Flyers => "flyers",
            Self::Brochures => "brochures",
            Self::Posters => "posters",
            Self::Banners => "banners",
            Self::Postcards => "postcards",
            Self::Letterheads => "letterheads",
            Self::Envelopes => "envelopes",
            Self::Booklets => "booklets",
            Self::Catalogs => "catalogs",
        }
    }

    /// Size used when the request does not name one.
    pub fn default_size(&self) -> &'static str {
        match self {
            Self::BusinessCards => "3.5x2",
            Self::Flyers | Self::Brochures | Self::Letterheads | Self::Catalogs => "8.5x11",
            Self::Posters => "11x17",
            Self::Banners => "24x36",
            Self::Postcards => "4x6",
            Self::Envelopes => "4x9.5",
            Self::Booklets => "5.5x8.5",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Print attributes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sides {
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    FullColor,
    BlackWhite,
    SpotColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    Matte,
    Gloss,
    Satin,
    Uncoated,
    SoftTouch,
}

/// Finishing options, declared in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintOption {
    RoundedCorners,
    FoilStamping,
    Embossing,
    SpotUv,
    Lamination,
    Perforation,
    DieCut,
}

impl PrintOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundedCorners => "rounded_corners",
            Self::FoilStamping => "foil_stamping",
            Self::Embossing => "embossing",
            Self::SpotUv => "spot_uv",
            Self::Lamination => "lamination",
            Self::Perforation => "perforation",
            Self::DieCut => "die_cut",
        }
    }
}

impl fmt::Display for PrintOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields whose value can come from a default instead of the request text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecField {
    ProductType,
    Quantity,
    Size,
    PaperStock,
    Sides,
    ColorMode,
    Finish,
}

impl SpecField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductType => "product_type",
            Self::Quantity => "quantity",
            Self::Size => "size",
            Self::PaperStock => "paper_stock",
            Self::Sides => "sides",
            Self::ColorMode => "color_mode",
            Self::Finish => "finish",
        }
    }
}

// ============================================================================
// Specification record
// ============================================================================

/// Structured print job specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSpecification {
    pub product_type: ProductType,
    pub quantity: u32,
    pub size: String,
    /// "<weight> <surface>", e.g. "14pt cardstock"
    pub paper_stock: String,
    pub sides: Sides,
    pub color_mode: ColorMode,
    pub finish: Finish,
    pub options: Vec<PrintOption>,
    /// 0 = same day
    pub turnaround_days: Option<u32>,
    pub is_rush: bool,
    pub artwork_dpi: Option<u32>,
    pub raw_input: String,
    /// Fields filled from defaults rather than detected in the text, in
    /// declaration order of [`SpecField`]. Internal only; callers see them
    /// as `missing_fields` on the validation result.
    #[serde(skip)]
    pub defaulted_fields: Vec<SpecField>,
}

impl PrintSpecification {
    pub fn was_defaulted(&self, field: SpecField) -> bool {
        self.defaulted_fields.contains(&field)
    }

    pub fn has_option(&self, option: PrintOption) -> bool {
        self.options.contains(&option)
    }
}
