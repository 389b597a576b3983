use axum::{extract::State, http::HeaderMap, response::Response};
use std::sync::Arc;

use crate::api::{DataResponse, MessageResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestIdExt;
use crate::services::RateCard;

/// The active rate card, for audit.
pub async fn get_rate_card(State(state): State<Arc<AppState>>) -> DataResponse<RateCard> {
    DataResponse::new(state.rate_cards.snapshot().as_ref().clone())
}

/// Re-read the rate card file and swap it in. A bad file leaves the active
/// card in place.
pub async fn reload_rate_card(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<MessageResponse, Response> {
    let request_id = headers.request_id_or_new();
    let store = state.rate_cards.clone();
    let path = state.settings.rate_card_path.clone();

    let card = tokio::task::spawn_blocking(move || store.reload_from(&path))
        .await
        .map_err(|e| ApiError::Internal(anyhow::Error::from(e)).with_request_id(&request_id))?
        .map_err(|e| ApiError::from(e).with_request_id(&request_id))?;

    Ok(MessageResponse::with_code(
        format!("Rate card {} is now active", card.version),
        "RATE_CARD_RELOADED",
    ))
}
