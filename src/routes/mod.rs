pub mod health;
pub mod intake;
pub mod rate_card;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Intake pipeline
        .route("/intake", post(intake::submit_intake))
        // Rate card administration
        .route("/rate-card", get(rate_card::get_rate_card))
        .route("/rate-card/reload", post(rate_card::reload_rate_card))
}
