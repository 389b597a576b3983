//! Unified API error handling
//!
//! The intake pipeline never fails; these errors cover the rate card
//! administration routes and request plumbing.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::rate_card::RateCardError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate card rejected: {0}")]
    RateCard(#[from] RateCardError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::RateCard(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::RateCard(_) => "RATE_CARD_INVALID",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::RateCard(e) => e.to_string(),
            // Don't leak internal error details
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    /// Convert into a response carrying the caller's request id.
    pub fn with_request_id(self, request_id: &str) -> Response {
        let mut body = self.body();
        body.request_id = Some(request_id.to_string());
        (self.status_code(), Json(body)).into_response()
    }

    fn body(&self) -> ErrorResponse {
        match self {
            Self::Internal(e) => tracing::error!(error = ?e, "Internal server error"),
            _ => tracing::warn!(error = %self, "API error"),
        }

        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.body())).into_response()
    }
}
