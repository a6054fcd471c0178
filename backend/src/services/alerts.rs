//! Alert deriver: low-stock, out-of-stock and expired-lot reports
//!
//! Alerts are computed from the stock snapshot on every call and never
//! stored, so re-deriving without intervening mutations yields the identical
//! report. Reads take no lock; a slightly stale snapshot is acceptable for
//! alerting.

use chrono::Utc;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::services::stock::StockService;
use shared::models::{derive_alerts, AlertReport};

/// Alert deriver service
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
    low_stock_threshold: i64,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool, low_stock_threshold: i64) -> Self {
        Self {
            db,
            low_stock_threshold,
        }
    }

    /// Derive the current alert report.
    pub async fn derive(&self) -> AppResult<AlertReport> {
        let stock = StockService::new(self.db.clone());
        let lots = stock.snapshot().await?;

        Ok(derive_alerts(
            &lots,
            self.low_stock_threshold,
            Utc::now().date_naive(),
        ))
    }
}
