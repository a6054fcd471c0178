//! HTTP handlers for the stock alert report

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::alerts::AlertService;
use crate::AppState;
use shared::models::AlertReport;

/// Derive the current low-stock / out-of-stock / expired-lot report
pub async fn get_alert_report(State(state): State<AppState>) -> AppResult<Json<AlertReport>> {
    let service = AlertService::new(state.db, state.config.inventory.low_stock_threshold);
    let report = service.derive().await?;
    Ok(Json(report))
}
