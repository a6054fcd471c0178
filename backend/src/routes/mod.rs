//! Route definitions for the Veterinary Clinic Management Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Inventory ledger: stock, intake, consumption, alerts
        .nest("/inventory", inventory_routes())
        // Prescription advisory
        .nest("/prescriptions", prescription_routes())
}

/// Inventory ledger routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        // Purchase intake and the receipt audit trail
        .route(
            "/receipts",
            get(handlers::list_receipts).post(handlers::record_receipt),
        )
        .route("/receipts/:receipt_id", get(handlers::get_receipt))
        // Per-item stock reads
        .route(
            "/items/:item_kind/:item_id",
            get(handlers::get_item_overview),
        )
        .route(
            "/items/:item_kind/:item_id/lots",
            get(handlers::list_item_lots),
        )
        .route(
            "/items/:item_kind/:item_id/availability",
            get(handlers::get_item_availability),
        )
        // Consumption recording and reversal
        .route("/consumptions", post(handlers::record_consumption))
        .route(
            "/consumptions/:record_id",
            get(handlers::get_consumption).delete(handlers::reverse_consumption),
        )
        // Encounter-scoped listing for the clinical system's reversal cascade
        .route(
            "/encounters/:encounter_ref/consumptions",
            get(handlers::list_encounter_consumptions),
        )
        // Derived alerts
        .route("/alerts", get(handlers::get_alert_report))
        // Stock change feed
        .route("/events", get(handlers::poll_stock_events))
}

/// Prescription advisory routes
fn prescription_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::record_prescription))
        .route("/evaluate", post(handlers::evaluate_prescription))
}
