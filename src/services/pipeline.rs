//! Intake pipeline: extract, validate, price.
//!
//! Every outcome is a well-formed [`IntakeResponse`]; nothing here returns an
//! error to the caller.

use crate::domain::{IntakeResponse, IntakeStatus, RawIntake, ValidationResult};
use crate::services::rate_card::RateCard;
use crate::services::{extractor, pricing, validator};

const EXTRACTION_FAILED: &str =
    "No print specification could be extracted: the request has no usable content or metadata";

const ADVISORY_NOTE: &str =
    "Advisory only: this request has blocking validation errors, so this estimate is not an offer";

/// Run one request through the pipeline against a single rate card snapshot.
pub fn process_intake(request_id: &str, intake: &RawIntake, card: &RateCard) -> IntakeResponse {
    let Some(spec) = extractor::extract(intake) else {
        tracing::info!(
            request_id,
            input_kind = ?intake.input_kind,
            "Extraction failed: nothing to read"
        );
        return IntakeResponse {
            request_id: request_id.to_string(),
            status: IntakeStatus::ExtractionFailed,
            extracted_specs: None,
            validation: ValidationResult::extraction_failed(EXTRACTION_FAILED),
            estimate: None,
        };
    };

    let validation = validator::validate(&spec, Some(spec.raw_input.as_str()), card);

    let mut estimate = pricing::calculate_price(&spec, card);
    let status = if validation.is_valid {
        IntakeStatus::Success
    } else {
        estimate.estimate_notes.push(ADVISORY_NOTE.to_string());
        IntakeStatus::ValidationErrors
    };

    tracing::info!(
        request_id,
        status = ?status,
        product_type = %spec.product_type,
        quantity = spec.quantity,
        print_method = %estimate.print_method,
        total = %estimate.total,
        rate_card = %card.version,
        "Processed intake request"
    );

    IntakeResponse {
        request_id: request_id.to_string(),
        status,
        extracted_specs: Some(spec),
        validation,
        estimate: Some(estimate),
    }
}
