//! Validation result types

use serde::{Deserialize, Serialize};

/// Three-tier feasibility judgment for a specification.
///
/// `is_valid` is derived from `errors`; use [`ValidationResult::from_findings`]
/// so the two never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub missing_fields: Vec<String>,
}

impl ValidationResult {
    pub fn from_findings(
        errors: Vec<String>,
        warnings: Vec<String>,
        missing_fields: Vec<String>,
    ) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            missing_fields,
        }
    }

    /// Result for a request that produced no specification at all.
    pub fn extraction_failed(reason: impl Into<String>) -> Self {
        Self::from_findings(vec![reason.into()], Vec::new(), Vec::new())
    }
}
