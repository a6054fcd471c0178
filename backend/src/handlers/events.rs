//! HTTP handlers for the stock change feed

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::services::events::EventPage;
use crate::AppState;

/// Query parameters for polling the change feed
#[derive(Debug, Deserialize)]
pub struct EventPollQuery {
    /// Sequence cursor; events with higher numbers are returned. 0 = from the start.
    #[serde(default)]
    pub after: u64,
}

/// Poll for stock changes newer than a sequence cursor
pub async fn poll_stock_events(
    State(state): State<AppState>,
    Query(query): Query<EventPollQuery>,
) -> Json<EventPage> {
    Json(state.stock_events.since(query.after))
}
