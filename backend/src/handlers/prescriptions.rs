//! HTTP handlers for prescription advisory endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::prescriptions::{
    EvaluateInput, PrescriptionService, RecordPrescriptionInput,
};
use crate::AppState;
use shared::models::{AvailabilityEvaluation, PrescriptionRecord};

/// Check how a requested quantity compares to current stock
pub async fn evaluate_prescription(
    State(state): State<AppState>,
    Json(input): Json<EvaluateInput>,
) -> AppResult<Json<AvailabilityEvaluation>> {
    let service = PrescriptionService::new(state.db);
    let evaluation = service.evaluate(input).await?;
    Ok(Json(evaluation))
}

/// Record a prescription with its advisory snapshot
pub async fn record_prescription(
    State(state): State<AppState>,
    Json(input): Json<RecordPrescriptionInput>,
) -> AppResult<Json<PrescriptionRecord>> {
    let service = PrescriptionService::new(state.db);
    let record = service.record(input).await?;
    Ok(Json(record))
}
