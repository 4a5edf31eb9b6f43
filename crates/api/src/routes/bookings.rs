//! Travel booking endpoints backed by the saga coordinator.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::BookTravelCommand;
use event_store::EventStore;
use saga::TravelBookingSaga;
use serde::Serialize;
use tracing::Instrument;

use super::parse_aggregate_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct BookingResponse {
    pub booking_id: String,
    pub customer_id: String,
    pub state: String,
    pub current_step: Option<String>,
    pub completed_steps: Vec<StepResponse>,
    pub failed_step: Option<String>,
    pub failure_reason: Option<String>,
    pub compensations: Vec<CompensationResponse>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

#[derive(Serialize)]
pub struct StepResponse {
    pub step: String,
    pub confirmation: String,
}

#[derive(Serialize)]
pub struct CompensationResponse {
    pub step: String,
    pub error: Option<String>,
}

impl BookingResponse {
    fn from_saga(booking_id: impl ToString, saga: &TravelBookingSaga) -> Self {
        Self {
            booking_id: booking_id.to_string(),
            customer_id: saga
                .customer_id()
                .map(|c| c.to_string())
                .unwrap_or_default(),
            state: saga.state().to_string(),
            current_step: saga.current_step().map(|s| s.to_string()),
            completed_steps: saga
                .completed_steps()
                .iter()
                .map(|c| StepResponse {
                    step: c.step.to_string(),
                    confirmation: c.confirmation.clone(),
                })
                .collect(),
            failed_step: saga.failed_step().map(|s| s.to_string()),
            failure_reason: saga.failure_reason().map(String::from),
            compensations: saga
                .compensations()
                .iter()
                .map(|c| CompensationResponse {
                    step: c.step.to_string(),
                    error: c.error.clone(),
                })
                .collect(),
            started_at: saga.started_at().map(|t| t.to_rfc3339()),
            finished_at: saga.finished_at().map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct EventEnvelopeResponse {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub version: i64,
    pub timestamp: String,
    pub payload: serde_json::Value,
}

/// POST /bookings: run the booking saga to its end.
///
/// Answers 201 with the final saga state, `Completed` or `Failed`. The saga
/// runs on its own task, so a client that disconnects mid-booking does not
/// stop it between steps.
#[tracing::instrument(skip(state, cmd), fields(booking_id = %cmd.booking_id))]
pub async fn book<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(cmd): Json<BookTravelCommand>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let task_state = Arc::clone(&state);
    let saga_id = tokio::spawn(
        async move { task_state.bookings.book_travel(cmd).await }.in_current_span(),
    )
    .await
    .map_err(|e| ApiError::Internal(format!("Booking task failed: {e}")))??;

    let saga = state
        .bookings
        .get_saga(saga_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Booking {saga_id} missing after execution")))?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse::from_saga(saga_id, &saga)),
    ))
}

/// GET /bookings/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let saga_id = parse_aggregate_id(&id)?;

    let saga = state
        .bookings
        .get_saga(saga_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Booking {id} not found")))?;

    Ok(Json(BookingResponse::from_saga(saga_id, &saga)))
}

/// GET /bookings/{id}/events: the saga's event history, oldest first.
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEnvelopeResponse>>, ApiError> {
    let saga_id = parse_aggregate_id(&id)?;

    let envelopes = state.bookings.saga_history(saga_id).await?;
    if envelopes.is_empty() {
        return Err(ApiError::NotFound(format!("Booking {id} not found")));
    }

    let responses = envelopes
        .into_iter()
        .map(|e| EventEnvelopeResponse {
            event_id: e.event_id.to_string(),
            event_type: e.event_type,
            aggregate_id: e.aggregate_id.to_string(),
            version: e.version.as_i64(),
            timestamp: e.timestamp.to_rfc3339(),
            payload: e.payload,
        })
        .collect();

    Ok(Json(responses))
}
