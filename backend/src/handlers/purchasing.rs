//! HTTP handlers for purchase intake endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::purchasing::{
    PurchasingService, ReceiptDetail, ReceiptResponse, RecordReceiptInput,
};
use crate::AppState;
use shared::models::PurchaseReceipt;
use shared::types::{PaginatedResponse, Pagination};

/// Query parameters for the receipt listing
#[derive(Debug, Deserialize)]
pub struct ReceiptListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Record a purchase receipt and apply its lines to stock
pub async fn record_receipt(
    State(state): State<AppState>,
    Json(input): Json<RecordReceiptInput>,
) -> AppResult<Json<ReceiptResponse>> {
    let service = PurchasingService::new(
        state.db,
        state.stock_events,
        state.config.inventory.default_location.clone(),
    );
    let receipt = service.record_receipt(input).await?;
    Ok(Json(receipt))
}

/// Get one receipt with its lines
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<Json<ReceiptDetail>> {
    let service = PurchasingService::new(
        state.db,
        state.stock_events,
        state.config.inventory.default_location.clone(),
    );
    let detail = service.get_receipt(receipt_id).await?;
    Ok(Json(detail))
}

/// List receipts, newest first
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(query): Query<ReceiptListQuery>,
) -> AppResult<Json<PaginatedResponse<PurchaseReceipt>>> {
    let default = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(default.page),
        per_page: query.per_page.unwrap_or(default.per_page),
    };

    let service = PurchasingService::new(
        state.db,
        state.stock_events,
        state.config.inventory.default_location.clone(),
    );
    let receipts = service.list_receipts(pagination).await?;
    Ok(Json(receipts))
}
