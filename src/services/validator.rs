//! Specification validator
//!
//! Sorts findings into blocking errors, advisory warnings and missing-field
//! notices. Every rule runs; nothing short-circuits.

use crate::domain::{PrintOption, PrintSpecification, SpecField, ValidationResult};
use crate::services::rate_card::RateCard;

/// Order in which defaulted fields are reported.
const REPORTED_FIELDS: [SpecField; 7] = [
    SpecField::ProductType,
    SpecField::Quantity,
    SpecField::Size,
    SpecField::PaperStock,
    SpecField::Sides,
    SpecField::ColorMode,
    SpecField::Finish,
];

/// Validate `spec` against the business rules in `card`. `content` is the
/// text the specification was extracted from.
pub fn validate(spec: &PrintSpecification, content: Option<&str>, card: &RateCard) -> ValidationResult {
    let rules = &card.validation;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Content
    let content_length = content.map(|c| c.trim().chars().count()).unwrap_or(0);
    if content_length < rules.min_content_length {
        errors.push(format!(
            "Request is too short to be a real print request ({} characters, at least {} required)",
            content_length, rules.min_content_length
        ));
    }

    // Product
    if spec.was_defaulted(SpecField::ProductType) {
        warnings.push(format!(
            "Product type not recognized in the request; assuming {}. Please confirm the product.",
            spec.product_type
        ));
    }

    // Quantity
    let product_rates = card.product_rates(spec.product_type);
    let rates = product_rates.unwrap_or(&card.default_product);
    if spec.quantity == 0 {
        errors.push("Quantity must be a positive number".to_string());
    } else if spec.quantity < rates.minimum_quantity {
        errors.push(format!(
            "Minimum quantity for {} is {} units (requested {})",
            spec.product_type, rates.minimum_quantity, spec.quantity
        ));
    } else if spec.quantity > rates.maximum_quantity {
        warnings.push(format!(
            "Quantity {} exceeds {} units for {}; this order needs a manual quote",
            spec.quantity, rates.maximum_quantity, spec.product_type
        ));
    }
    if spec.quantity >= rules.volume_notice_quantity {
        warnings.push(format!(
            "Order of {} units qualifies for volume discount pricing",
            spec.quantity
        ));
    }

    // Size
    if !spec.was_defaulted(SpecField::Size) {
        if let Some(rates) = product_rates.filter(|r| !r.standard_sizes.is_empty()) {
            if !rates.standard_sizes.iter().any(|s| s == &spec.size) {
                warnings.push(format!(
                    "Non-standard size '{}' for {}. Standard sizes: {}. Custom sizing may affect price.",
                    spec.size,
                    spec.product_type,
                    rates.standard_sizes.join(", ")
                ));
            }
        }
    }

    // Artwork
    if let Some(dpi) = spec.artwork_dpi {
        if dpi < rules.dpi_floor {
            errors.push(format!(
                "Artwork resolution too low ({dpi} DPI). At least {} DPI is required to print; {} DPI is recommended.",
                rules.dpi_floor, rules.dpi_recommended
            ));
        } else if dpi < rules.dpi_recommended {
            warnings.push(format!(
                "Artwork resolution ({dpi} DPI) is below the recommended {} DPI. Print quality may be affected.",
                rules.dpi_recommended
            ));
        }
    }

    // Turnaround
    let within_rush_window = spec
        .turnaround_days
        .is_some_and(|days| days <= rules.rush_window_days);
    // Fee language follows `is_rush`, the only flag pricing charges on.
    match spec.turnaround_days {
        Some(0) if spec.is_rush => warnings.push(
            "Same-day turnaround requested. Subject to availability; rush fees apply.".to_string(),
        ),
        _ if spec.is_rush => {
            warnings.push("Rush turnaround requested. Rush fees will apply.".to_string())
        }
        Some(days) if within_rush_window => warnings.push(format!(
            "Short turnaround of {days} day(s) requested; subject to production availability."
        )),
        _ => {}
    }
    if within_rush_window {
        let conflicting: Vec<&str> = spec
            .options
            .iter()
            .filter(|option| rules.lead_time_options.contains(option))
            .map(|option| option.as_str())
            .collect();
        if !conflicting.is_empty() {
            errors.push(format!(
                "Turnaround of {} day(s) conflicts with options that need extra lead time: {}",
                spec.turnaround_days.unwrap_or_default(),
                conflicting.join(", ")
            ));
        }
    }

    // Options
    if spec.has_option(PrintOption::FoilStamping) || spec.has_option(PrintOption::Embossing) {
        warnings.push(
            "Specialty finishes (foil/emboss) add 5-7 business days to production".to_string(),
        );
    }
    if spec.has_option(PrintOption::Embossing) && spec.has_option(PrintOption::Lamination) {
        warnings.push(
            "Embossing and lamination together may reduce emboss visibility".to_string(),
        );
    }

    let missing_fields = REPORTED_FIELDS
        .iter()
        .filter(|field| spec.was_defaulted(**field))
        .map(|field| field.as_str().to_string())
        .collect();

    let result = ValidationResult::from_findings(errors, warnings, missing_fields);

    tracing::info!(
        valid = result.is_valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        missing = result.missing_fields.len(),
        "Validated print specification"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductType;
    use crate::services::extractor::extract_from_text;

    fn card() -> RateCard {
        RateCard::builtin().unwrap()
    }

    fn check(text: &str) -> ValidationResult {
        let spec = extract_from_text(text);
        validate(&spec, Some(text), &card())
    }

    #[test]
    fn complete_rush_order_is_valid_with_warnings() {
        let result = check(
            "500 business cards, double-sided printing on 14pt cardstock, \
             matte finish with rounded corners. Rush order - need in 2 days.",
        );

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("Rush")));
        assert!(result.warnings.iter().any(|w| w.contains("volume discount")));
        assert_eq!(result.missing_fields, vec!["size", "color_mode"]);
    }

    #[test]
    fn below_minimum_quantity_blocks() {
        let result = check("10 business cards");

        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("Minimum quantity")));
    }

    #[test]
    fn zero_quantity_blocks() {
        let result = check("0 copies of our flyers");
        assert!(result.errors.iter().any(|e| e.contains("positive")));
    }

    #[test]
    fn short_or_absent_content_blocks() {
        let spec = extract_from_text("posters");
        let result = validate(&spec, Some("posters"), &card());
        assert!(result.errors.iter().any(|e| e.contains("too short")));

        let result = validate(&spec, None, &card());
        assert!(!result.is_valid);
    }

    #[test]
    fn missing_fields_never_affect_validity() {
        let result = check("a stack of 200 postcards");

        assert!(result.is_valid);
        assert_eq!(
            result.missing_fields,
            vec!["size", "paper_stock", "sides", "color_mode", "finish"]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn sides_default_is_reported_missing() {
        let result = check("300 flyers full color on 100lb gloss, matte finish");
        assert!(result.missing_fields.contains(&"sides".to_string()));
    }

    #[test]
    fn artwork_resolution_tiers() {
        let low = check("200 posters, artwork at 150 dpi");
        assert!(!low.is_valid);
        assert!(low.errors[0].contains("150 DPI"));

        let borderline = check("200 posters, artwork at 250 dpi");
        assert!(borderline.is_valid);
        assert!(borderline.warnings.iter().any(|w| w.contains("250 DPI")));

        let fine = check("200 posters, artwork at 300 dpi");
        assert!(!fine.warnings.iter().any(|w| w.contains("DPI")));
    }

    #[test]
    fn lead_time_options_conflict_with_short_turnaround() {
        let result = check("200 business cards with foil stamping, next day please");

        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("foil_stamping")));
        assert!(result.warnings.iter().any(|w| w.contains("Specialty finishes")));
    }

    #[test]
    fn lead_time_options_are_fine_with_normal_turnaround() {
        let result = check("200 business cards with embossing, 10 business days");
        assert!(result.is_valid);
    }

    #[test]
    fn non_standard_size_warns() {
        let result = check("100 posters at 5x7");
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("Non-standard size '5x7'")));
    }

    #[test]
    fn oversized_order_needs_manual_quote() {
        let result = check("900 banners for the festival");
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("manual quote")));
    }

    #[test]
    fn quantity_limits_fall_back_to_default_product() {
        let mut card = card();
        card.products.remove(&ProductType::Posters);
        card.default_product.minimum_quantity = 50;

        let text = "10 posters for the lobby";
        let result = validate(&extract_from_text(text), Some(text), &card);
        assert!(!result.is_valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.starts_with("Minimum quantity for posters is 50")));
    }

    #[test]
    fn unrecognized_product_warns() {
        let result = check("300 coasters with our logo");
        assert!(result.is_valid);
        assert_eq!(result.missing_fields[0], "product_type");
        assert!(result.warnings.iter().any(|w| w.contains("not recognized")));
    }

    #[test]
    fn short_turnaround_without_rush_mentions_no_fees() {
        let result = check("300 flyers on 100lb gloss, need in 2 days");
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("Short turnaround of 2 day(s)")));
        assert!(!result.warnings.iter().any(|w| w.contains("fee")));
    }

    #[test]
    fn same_day_has_its_own_warning() {
        let result = check("150 flyers same day");
        assert!(result.warnings.iter().any(|w| w.starts_with("Same-day")));
        assert!(!result.warnings.iter().any(|w| w.starts_with("Rush")));
    }

    #[test]
    fn embossing_with_lamination_warns() {
        let result = check("500 brochures with embossing and lamination");
        assert!(result.warnings.iter().any(|w| w.contains("emboss visibility")));
    }
}
