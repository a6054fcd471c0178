//! Item catalog client
//!
//! The item catalog (names, presentations, active flags) is owned by a
//! separate service and is mutable underneath the ledger. The ledger only
//! uses it to enrich read views; a missing or unreachable catalog never
//! blocks a stock operation.

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use shared::models::ItemKind;

/// Item catalog API client
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

/// Catalog entry for one item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<Decimal>,
    /// Controlled substances carry extra dispensing rules in the clinic UI.
    pub controlled: bool,
}

impl CatalogClient {
    /// Create a new CatalogClient
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Fetch one catalog entry.
    ///
    /// Returns `Ok(None)` when the catalog no longer knows the item; the
    /// ledger keeps serving its own rows for dangling references.
    pub async fn get_item(
        &self,
        item_kind: ItemKind,
        item_id: i32,
    ) -> AppResult<Option<CatalogItem>> {
        let url = format!(
            "{}/api/v1/catalog/{}/{}",
            self.base_url, item_kind, item_id
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| AppError::CatalogServiceUnavailable)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Catalog API error: {} - {}",
                status, body
            )));
        }

        let item: CatalogItem = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse catalog response: {}", e))
        })?;

        Ok(Some(item))
    }
}
