//! Stock ledger service: the single owner of lot quantities
//!
//! Every mutation of a lot quantity in the system funnels through
//! [`StockService::apply_delta`]. The non-negativity invariant is enforced
//! there by one conditional statement checked at the database, never by a
//! fetch-then-write sequence, so concurrent writers cannot oversell a lot.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{ItemAvailability, ItemKind, LotKey, StockLot};
use shared::validation::validate_delta;

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Attributes used when a positive delta has to create the lot row.
///
/// Passing `None` makes `apply_delta` strict: the row must already exist.
/// Reversals use the strict form so a restore never invents a lot.
#[derive(Debug, Clone)]
pub struct LotDefaults {
    pub location: String,
    pub expiry_date: Option<NaiveDate>,
}

/// Database row for a stock lot
#[derive(Debug, FromRow)]
struct StockLotRow {
    id: Uuid,
    item_kind: String,
    item_id: i32,
    lot_code: Option<String>,
    location: String,
    quantity: i32,
    expiry_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StockLotRow {
    fn into_model(self) -> AppResult<StockLot> {
        let item_kind = ItemKind::from_str(&self.item_kind).ok_or_else(|| {
            AppError::Internal(format!("Unknown item kind in stock row: {}", self.item_kind))
        })?;
        Ok(StockLot {
            id: self.id,
            item_kind,
            item_id: self.item_id,
            lot_code: self.lot_code,
            location: self.location,
            quantity: self.quantity,
            expiry_date: self.expiry_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply a signed quantity delta to exactly one lot row.
    ///
    /// Runs on the caller's connection so multi-step operations (receipts,
    /// consume-and-record) keep the delta inside their own transaction.
    /// Returns the lot's new quantity.
    ///
    /// - `delta < 0`: conditional decrement; fails with `InsufficientStock`
    ///   when it would take the quantity below zero, `UnknownLot` when no
    ///   row exists for the key. The precondition is evaluated inside the
    ///   UPDATE itself, so a stale availability read can never oversell.
    /// - `delta > 0` with `defaults`: upsert; creates the row at
    ///   `quantity = delta` on first receipt, otherwise increments in place.
    /// - `delta > 0` without `defaults`: strict increment of an existing row
    ///   (`UnknownLot` when missing).
    /// - `delta = 0` is rejected.
    pub async fn apply_delta(
        &self,
        conn: &mut PgConnection,
        key: &LotKey,
        delta: i32,
        defaults: Option<&LotDefaults>,
    ) -> AppResult<i32> {
        validate_delta(delta).map_err(|e| AppError::InvalidQuantity(e.to_string()))?;

        if delta > 0 {
            if let Some(defaults) = defaults {
                let quantity = sqlx::query_scalar::<_, i32>(
                    r#"
                    INSERT INTO stock_lots (item_kind, item_id, lot_code, location, quantity, expiry_date)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (item_kind, item_id, lot_code)
                    DO UPDATE SET quantity = stock_lots.quantity + EXCLUDED.quantity,
                                  expiry_date = COALESCE(stock_lots.expiry_date, EXCLUDED.expiry_date),
                                  updated_at = NOW()
                    RETURNING quantity
                    "#,
                )
                .bind(key.item_kind.as_str())
                .bind(key.item_id)
                .bind(&key.lot_code)
                .bind(&defaults.location)
                .bind(delta)
                .bind(defaults.expiry_date)
                .fetch_one(&mut *conn)
                .await?;

                return Ok(quantity);
            }
        }

        // Conditional in-place update; the WHERE clause is the invariant.
        let updated = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE stock_lots
            SET quantity = quantity + $4, updated_at = NOW()
            WHERE item_kind = $1 AND item_id = $2 AND lot_code IS NOT DISTINCT FROM $3
              AND quantity + $4 >= 0
            RETURNING quantity
            "#,
        )
        .bind(key.item_kind.as_str())
        .bind(key.item_id)
        .bind(&key.lot_code)
        .bind(delta)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(quantity) = updated {
            return Ok(quantity);
        }

        // Zero rows: either the lot does not exist or the guard failed.
        let held = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT quantity FROM stock_lots
            WHERE item_kind = $1 AND item_id = $2 AND lot_code IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(key.item_kind.as_str())
        .bind(key.item_id)
        .bind(&key.lot_code)
        .fetch_optional(&mut *conn)
        .await?;

        match held {
            Some(available) => Err(AppError::InsufficientStock {
                lot: key.to_string(),
                requested: -delta,
                available,
            }),
            None => Err(AppError::UnknownLot(key.to_string())),
        }
    }

    /// List the lots of one item, soonest expiry first.
    ///
    /// `only_available` hides depleted rows, the shape dispensing pickers
    /// want; audit views pass `false` and see everything.
    pub async fn list_lots(
        &self,
        item_kind: ItemKind,
        item_id: i32,
        only_available: bool,
    ) -> AppResult<Vec<StockLot>> {
        let rows = sqlx::query_as::<_, StockLotRow>(
            r#"
            SELECT id, item_kind, item_id, lot_code, location, quantity, expiry_date,
                   created_at, updated_at
            FROM stock_lots
            WHERE item_kind = $1 AND item_id = $2
              AND (NOT $3 OR quantity > 0)
            ORDER BY expiry_date ASC NULLS LAST, lot_code ASC
            "#,
        )
        .bind(item_kind.as_str())
        .bind(item_id)
        .bind(only_available)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockLotRow::into_model).collect()
    }

    /// Aggregate stock position of one item.
    ///
    /// `lot_count` counts every row ever created, including depleted ones;
    /// an item with rows summing to zero ran out, an item with no rows was
    /// never stocked. Prescription Advisory relies on that distinction.
    pub async fn availability(
        &self,
        item_kind: ItemKind,
        item_id: i32,
    ) -> AppResult<ItemAvailability> {
        let (lot_count, available) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(quantity), 0)
            FROM stock_lots
            WHERE item_kind = $1 AND item_id = $2
            "#,
        )
        .bind(item_kind.as_str())
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        Ok(ItemAvailability {
            item_kind,
            item_id,
            lot_count,
            available,
        })
    }

    /// Full stock snapshot, used by the alert deriver.
    pub async fn snapshot(&self) -> AppResult<Vec<StockLot>> {
        let rows = sqlx::query_as::<_, StockLotRow>(
            r#"
            SELECT id, item_kind, item_id, lot_code, location, quantity, expiry_date,
                   created_at, updated_at
            FROM stock_lots
            ORDER BY item_kind, item_id, lot_code NULLS FIRST
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockLotRow::into_model).collect()
    }
}
