//! HTTP handlers for consumption recording and reversal

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::consumption::{
    ConsumptionResponse, ConsumptionService, RecordConsumptionInput, ReversalResponse,
};
use crate::AppState;
use shared::models::ConsumptionRecord;

/// Record a consumption and deduct it from its lot
pub async fn record_consumption(
    State(state): State<AppState>,
    Json(input): Json<RecordConsumptionInput>,
) -> AppResult<Json<ConsumptionResponse>> {
    let service = ConsumptionService::new(state.db, state.stock_events);
    let response = service.consume(input).await?;
    Ok(Json(response))
}

/// Reverse a consumption: restore the lot and delete the record
pub async fn reverse_consumption(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<ReversalResponse>> {
    let service = ConsumptionService::new(state.db, state.stock_events);
    let response = service.reverse(record_id).await?;
    Ok(Json(response))
}

/// Get one consumption record
pub async fn get_consumption(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<ConsumptionRecord>> {
    let service = ConsumptionService::new(state.db, state.stock_events);
    let record = service.get_record(record_id).await?;
    Ok(Json(record))
}

/// List the consumptions tied to one encounter
pub async fn list_encounter_consumptions(
    State(state): State<AppState>,
    Path(encounter_ref): Path<Uuid>,
) -> AppResult<Json<Vec<ConsumptionRecord>>> {
    let service = ConsumptionService::new(state.db, state.stock_events);
    let records = service.list_by_encounter(encounter_ref).await?;
    Ok(Json(records))
}
