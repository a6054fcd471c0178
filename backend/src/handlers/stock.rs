//! HTTP handlers for stock ledger read endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::external::catalog::{CatalogClient, CatalogItem};
use crate::services::stock::StockService;
use crate::AppState;
use shared::models::{
    classify_availability, AvailabilityStatus, ItemAvailability, ItemKind, StockLot,
};

/// Query parameters for the lot listing
#[derive(Debug, Deserialize)]
pub struct LotListQuery {
    #[serde(default)]
    pub only_available: bool,
}

/// Item view combining catalog data with the stock position
#[derive(Debug, Serialize)]
pub struct ItemOverviewResponse {
    /// Catalog entry; absent when the reference dangles or the catalog is down.
    pub item: Option<CatalogItem>,
    pub status: AvailabilityStatus,
    pub availability: ItemAvailability,
    pub lots: Vec<StockLot>,
}

/// Get catalog display data plus the stock position of one item
pub async fn get_item_overview(
    State(state): State<AppState>,
    Path((item_kind, item_id)): Path<(ItemKind, i32)>,
) -> AppResult<Json<ItemOverviewResponse>> {
    let stock = StockService::new(state.db.clone());
    let availability = stock.availability(item_kind, item_id).await?;
    let lots = stock.list_lots(item_kind, item_id, false).await?;

    // Display enrichment only; a down catalog must not block the ledger view.
    let catalog = CatalogClient::new(state.config.catalog.api_endpoint.clone());
    let item = match catalog.get_item(item_kind, item_id).await {
        Ok(item) => item,
        Err(e) => {
            tracing::warn!("Catalog lookup failed for {}#{}: {}", item_kind, item_id, e);
            None
        }
    };

    let status = classify_availability(availability.lot_count, availability.available);

    Ok(Json(ItemOverviewResponse {
        item,
        status,
        availability,
        lots,
    }))
}

/// List the stock lots of one item
pub async fn list_item_lots(
    State(state): State<AppState>,
    Path((item_kind, item_id)): Path<(ItemKind, i32)>,
    Query(query): Query<LotListQuery>,
) -> AppResult<Json<Vec<StockLot>>> {
    let service = StockService::new(state.db);
    let lots = service
        .list_lots(item_kind, item_id, query.only_available)
        .await?;
    Ok(Json(lots))
}

/// Get the aggregate availability of one item
pub async fn get_item_availability(
    State(state): State<AppState>,
    Path((item_kind, item_id)): Path<(ItemKind, i32)>,
) -> AppResult<Json<ItemAvailability>> {
    let service = StockService::new(state.db);
    let availability = service.availability(item_kind, item_id).await?;
    Ok(Json(availability))
}
