//! Intake request and response envelope

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::estimate::PriceEstimate;
use super::specs::PrintSpecification;
use super::validation::ValidationResult;

/// How the request reached us. Only text is read directly; pdf and image
/// requests carry pre-extracted text or upload metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Pdf,
    Image,
}

/// Incoming print-job request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIntake {
    #[serde(alias = "input_type")]
    pub input_kind: InputKind,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

#[cfg(test)]
impl RawIntake {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            input_kind: InputKind::Text,
            content: Some(content.into()),
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    Success,
    ValidationErrors,
    ExtractionFailed,
}

/// Response envelope returned to the caller and published to the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeResponse {
    pub request_id: String,
    pub status: IntakeStatus,
    pub extracted_specs: Option<PrintSpecification>,
    pub validation: ValidationResult,
    pub estimate: Option<PriceEstimate>,
}
