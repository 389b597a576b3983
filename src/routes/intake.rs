use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::RawIntake;
use crate::error::ApiError;
use crate::middleware::RequestIdExt;
use crate::services::{process_intake, WorkflowEvent};

/// Run a print request through extraction, validation and pricing.
///
/// Pipeline outcomes, including extraction failures, are always 200 with an
/// `IntakeResponse`; only an unreadable body is rejected.
pub async fn submit_intake(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<RawIntake>, JsonRejection>,
) -> Response {
    let request_id = headers.request_id_or_new();

    let Json(intake) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return ApiError::BadRequest(rejection.body_text()).with_request_id(&request_id)
        }
    };

    tracing::info!(
        request_id = %request_id,
        input_kind = ?intake.input_kind,
        "Processing intake request"
    );

    let card = state.rate_cards.snapshot();
    let response = process_intake(&request_id, &intake, &card);

    state
        .publisher
        .publish(WorkflowEvent::new(&response, intake.input_kind));

    Json(response).into_response()
}
