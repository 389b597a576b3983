//! Specification extractor
//!
//! Heuristic field detection over the request text. Each field has its own
//! rule table (see [`crate::services::rules`]); fields that no rule detects
//! are filled from defaults and recorded in `defaulted_fields` so the
//! validator can report them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::domain::{
    ColorMode, Finish, InputKind, PrintOption, PrintSpecification, ProductType, RawIntake, Sides,
    SpecField,
};
use crate::services::rules::{all_matches, first_match, Rule};

const DEFAULT_QUANTITY: u32 = 500;
const DEFAULT_PAPER_WEIGHT: &str = "14pt";
const DEFAULT_PAPER_SURFACE: &str = "cardstock";

// ============================================================================
// Patterns
// ============================================================================

/// `11 x 17`, `11" x 17"` and `11×17` all compact to `11x17`.
static DIMENSION_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\d)\s*(?:"|in\b|inch\b|inches\b)?\s*[x×]\s*(\d)"#).expect("valid regex")
});

/// Numbers that are never a quantity: sizes, paper weights, resolutions,
/// turnaround day counts.
static NON_QUANTITY_NUMBERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\d+(?:\.\d+)?x\d+(?:\.\d+)?|\d+\s*#|\d+\s*(?:pt|lb|lbs|dpi|ppi|gsm)\b|\d+\s*(?:-\s*)?(?:business\s+|working\s+)?days?\b",
    )
    .expect("valid regex")
});

static QUANTITY_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d{1,3}(?:,\d{3})+|\d+)\s*(?:copies|copy|pieces|pcs|units|sets|sheets|prints|business cards|cards|flyers|fliers|leaflets|brochures|posters|banners|postcards|post cards|letterheads|envelopes|booklets|catalogs|catalogues)\b",
    )
    .expect("valid regex")
});

static QUANTITY_THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)\s*k\b").expect("valid regex"));

static QUANTITY_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(\d{1,3}(?:,\d{3})+|\d+)(?:[\s,.;:!?)]|$)").expect("valid regex")
});

static TURNAROUND_DAYS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+)\s*(?:-\s*)?(?:business\s+|working\s+)?days?\b").expect("valid regex")
});

static ARTWORK_DPI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)\s*(?:dpi|ppi)\b").expect("valid regex"));

static URGENCY_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:rush|urgent|asap)\b|\b(?:next|same)[- ]day\b").expect("valid regex")
});

static RUSH_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\brush\b").expect("valid regex"));

fn whole(n: u64) -> Option<u32> {
    u32::try_from(n).ok()
}

fn thousands(n: u64) -> Option<u32> {
    n.checked_mul(1000).and_then(whole)
}

// ============================================================================
// Rule tables
// ============================================================================

static PRODUCT_RULES: &[Rule<ProductType>] = &[
    Rule::Phrase(&["business card", "biz card"], ProductType::BusinessCards),
    Rule::Phrase(&["postcard", "post card"], ProductType::Postcards),
    Rule::Phrase(&["flyer", "flier", "leaflet"], ProductType::Flyers),
    Rule::Phrase(&["brochure"], ProductType::Brochures),
    Rule::Phrase(&["poster"], ProductType::Posters),
    Rule::Phrase(&["banner"], ProductType::Banners),
    Rule::Phrase(&["letterhead"], ProductType::Letterheads),
    Rule::Phrase(&["envelope"], ProductType::Envelopes),
    Rule::Phrase(&["booklet"], ProductType::Booklets),
    Rule::Phrase(&["catalog", "catalogue"], ProductType::Catalogs),
];

static QUANTITY_RULES: &[Rule<u32>] = &[
    Rule::Number(&QUANTITY_WITH_UNIT, whole),
    Rule::Number(&QUANTITY_THOUSANDS, thousands),
    Rule::Number(&QUANTITY_BARE, whole),
];

/// Matched against the dimension-compacted text.
static SIZE_RULES: &[Rule<&str>] = &[
    Rule::Phrase(&["8.5x11"], "8.5x11"),
    Rule::Phrase(&["5.5x8.5"], "5.5x8.5"),
    Rule::Phrase(&["11x17"], "11x17"),
    Rule::Phrase(&["18x24"], "18x24"),
    Rule::Phrase(&["24x36"], "24x36"),
    Rule::Phrase(&["3.5x2"], "3.5x2"),
    Rule::Phrase(&["2x3.5"], "2x3.5"),
    Rule::Phrase(&["4x9.5"], "4x9.5"),
    Rule::Phrase(&["4x6"], "4x6"),
    Rule::Phrase(&["5x7"], "5x7"),
    Rule::Phrase(&["6x9"], "6x9"),
    Rule::Phrase(&["a4"], "a4"),
    Rule::Phrase(&["a3"], "a3"),
];

static PAPER_WEIGHT_RULES: &[Rule<&str>] = &[
    Rule::Phrase(&["14pt", "14 pt"], "14pt"),
    Rule::Phrase(&["16pt", "16 pt"], "16pt"),
    Rule::Phrase(&["100lb", "100 lb", "100#"], "100lb"),
    Rule::Phrase(&["80lb", "80 lb", "80#"], "80lb"),
];

static PAPER_SURFACE_RULES: &[Rule<&str>] = &[
    Rule::Phrase(&["cardstock", "card stock"], "cardstock"),
    Rule::Phrase(&["recycled"], "recycled"),
    Rule::Phrase(&["uncoated"], "uncoated"),
    Rule::Phrase(&["gloss"], "gloss"),
    Rule::Phrase(&["matte"], "matte"),
];

static SIDES_RULES: &[Rule<Sides>] = &[
    Rule::Phrase(
        &["double-sided", "double sided", "both sides", "two-sided", "two sided", "2-sided", "2 sided", "front and back"],
        Sides::Double,
    ),
    Rule::Phrase(
        &["single-sided", "single sided", "one side", "one-sided", "1-sided", "front only"],
        Sides::Single,
    ),
];

static COLOR_RULES: &[Rule<ColorMode>] = &[
    Rule::Phrase(
        &["full color", "full-color", "full colour", "full-colour", "cmyk", "4-color", "four color"],
        ColorMode::FullColor,
    ),
    Rule::Phrase(
        &["black and white", "black & white", "black-and-white", "b&w", "grayscale", "greyscale", "monochrome"],
        ColorMode::BlackWhite,
    ),
    Rule::Phrase(&["spot color", "spot-color", "spot colour", "pantone"], ColorMode::SpotColor),
];

static FINISH_RULES: &[Rule<Finish>] = &[
    Rule::Phrase(&["soft touch", "soft-touch"], Finish::SoftTouch),
    Rule::Phrase(&["uncoated"], Finish::Uncoated),
    Rule::Phrase(&["satin"], Finish::Satin),
    Rule::Phrase(&["glossy", "gloss"], Finish::Gloss),
    Rule::Phrase(&["matte", "matt "], Finish::Matte),
];

/// Catalog order; every matching option is kept.
static OPTION_RULES: &[Rule<PrintOption>] = &[
    Rule::Phrase(&["rounded corner", "round corner", "rounded-corner"], PrintOption::RoundedCorners),
    Rule::Phrase(&["foil"], PrintOption::FoilStamping),
    Rule::Phrase(&["emboss"], PrintOption::Embossing),
    Rule::Phrase(&["spot uv", "spot-uv"], PrintOption::SpotUv),
    Rule::Phrase(&["laminat"], PrintOption::Lamination),
    Rule::Phrase(&["perforat"], PrintOption::Perforation),
    Rule::Phrase(&["die cut", "die-cut", "diecut"], PrintOption::DieCut),
];

static TURNAROUND_RULES: &[Rule<u32>] = &[
    Rule::Number(&TURNAROUND_DAYS, whole),
    Rule::Phrase(&["same day", "same-day"], 0),
    Rule::Phrase(&["next day", "next-day"], 1),
    Rule::Pattern(&RUSH_WORD, 2),
];

static RUSH_RULES: &[Rule<bool>] = &[Rule::Pattern(&URGENCY_WORDS, true)];

static DPI_RULES: &[Rule<u32>] = &[Rule::Number(&ARTWORK_DPI, whole)];

// ============================================================================
// Extraction
// ============================================================================

/// Text the extractor should read for this request, or `None` when the
/// request carries nothing usable.
///
/// No OCR is done: pdf and image requests use pre-extracted content when
/// present and otherwise a description built from the upload metadata.
pub fn resolve_text(intake: &RawIntake) -> Option<String> {
    let content = intake
        .content
        .as_deref()
        .filter(|content| !content.trim().is_empty())
        .map(str::to_string);

    match intake.input_kind {
        InputKind::Text => content,
        InputKind::Pdf => {
            content.or_else(|| describe_upload("PDF document", intake.metadata.as_ref()))
        }
        InputKind::Image => {
            content.or_else(|| describe_upload("Image document", intake.metadata.as_ref()))
        }
    }
}

fn describe_upload(
    label: &str,
    metadata: Option<&BTreeMap<String, serde_json::Value>>,
) -> Option<String> {
    let metadata = metadata.filter(|m| !m.is_empty())?;
    let json = serde_json::to_string(metadata).ok()?;
    Some(format!("{label}: {json}"))
}

/// Extract a specification from a request; `None` means extraction failed.
pub fn extract(intake: &RawIntake) -> Option<PrintSpecification> {
    let text = resolve_text(intake)?;
    Some(extract_from_text(&text))
}

/// Run every field detector over `raw`. Never fails; undetected fields get
/// defaults and are listed in `defaulted_fields`.
pub fn extract_from_text(raw: &str) -> PrintSpecification {
    let lower = raw.to_lowercase();
    let compact = DIMENSION_SPACING.replace_all(&lower, "${1}x${2}");
    let quantity_text = NON_QUANTITY_NUMBERS.replace_all(&compact, " ");

    let mut defaulted = Vec::new();

    let product_type = or_default(
        first_match(PRODUCT_RULES, &lower),
        SpecField::ProductType,
        &mut defaulted,
        || ProductType::BusinessCards,
    );

    let quantity = or_default(
        first_match(QUANTITY_RULES, &quantity_text),
        SpecField::Quantity,
        &mut defaulted,
        || DEFAULT_QUANTITY,
    );

    let size = or_default(
        first_match(SIZE_RULES, &compact),
        SpecField::Size,
        &mut defaulted,
        || product_type.default_size(),
    )
    .to_string();

    let weight = first_match(PAPER_WEIGHT_RULES, &lower);
    let surface = first_match(PAPER_SURFACE_RULES, &lower);
    if weight.is_none() || surface.is_none() {
        defaulted.push(SpecField::PaperStock);
    }
    let paper_stock = format!(
        "{} {}",
        weight.unwrap_or(DEFAULT_PAPER_WEIGHT),
        surface.unwrap_or(DEFAULT_PAPER_SURFACE)
    );

    let sides = or_default(
        first_match(SIDES_RULES, &lower),
        SpecField::Sides,
        &mut defaulted,
        || Sides::Double,
    );

    let color_mode = or_default(
        first_match(COLOR_RULES, &lower),
        SpecField::ColorMode,
        &mut defaulted,
        || ColorMode::FullColor,
    );

    let finish = or_default(
        first_match(FINISH_RULES, &lower),
        SpecField::Finish,
        &mut defaulted,
        || Finish::Matte,
    );

    let spec = PrintSpecification {
        product_type,
        quantity,
        size,
        paper_stock,
        sides,
        color_mode,
        finish,
        options: all_matches(OPTION_RULES, &lower),
        turnaround_days: first_match(TURNAROUND_RULES, &lower),
        is_rush: first_match(RUSH_RULES, &lower).unwrap_or(false),
        artwork_dpi: first_match(DPI_RULES, &lower),
        raw_input: raw.to_string(),
        defaulted_fields: defaulted,
    };

    tracing::debug!(
        product_type = %spec.product_type,
        quantity = spec.quantity,
        is_rush = spec.is_rush,
        defaulted = ?spec.defaulted_fields,
        "Extracted print specification"
    );

    spec
}

fn or_default<T>(
    detected: Option<T>,
    field: SpecField,
    defaulted: &mut Vec<SpecField>,
    fallback: impl FnOnce() -> T,
) -> T {
    detected.unwrap_or_else(|| {
        defaulted.push(field);
        fallback()
    })
}
