//! Consumption recorder and reversal handler
//!
//! The only component allowed to decrement stock. A consumption deducts from
//! exactly one lot and writes its ledger record in the same transaction, so
//! the record set and the lot quantities always reconcile. Reversal is the
//! exact inverse and is the deletion path the clinical system must call
//! before removing an encounter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::events::{StockEventKind, StockEvents};
use crate::services::stock::StockService;
use shared::models::{ConsumptionRecord, ItemKind, LotKey};
use shared::validation::validate_quantity;

/// Consumption recorder service
#[derive(Clone)]
pub struct ConsumptionService {
    db: PgPool,
    events: StockEvents,
}

/// Input for recording a consumption
#[derive(Debug, Deserialize)]
pub struct RecordConsumptionInput {
    pub encounter_ref: Uuid,
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub lot_code: Option<String>,
    pub quantity: i32,
    pub note: Option<String>,
}

/// Response for a completed consumption
#[derive(Debug, Serialize)]
pub struct ConsumptionResponse {
    pub record: ConsumptionRecord,
    /// Quantity left in the lot after the deduction.
    pub new_quantity: i32,
}

/// Response for a completed reversal
#[derive(Debug, Serialize)]
pub struct ReversalResponse {
    pub reversed: ConsumptionRecord,
    /// Quantity in the originating lot after the restore.
    pub new_quantity: i32,
}

/// Database row for a consumption record
#[derive(Debug, FromRow)]
struct ConsumptionRow {
    id: Uuid,
    encounter_ref: Uuid,
    item_kind: String,
    item_id: i32,
    lot_code: Option<String>,
    quantity: i32,
    note: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl ConsumptionRow {
    fn into_model(self) -> AppResult<ConsumptionRecord> {
        let item_kind = ItemKind::from_str(&self.item_kind).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown item kind in consumption record: {}",
                self.item_kind
            ))
        })?;
        Ok(ConsumptionRecord {
            id: self.id,
            encounter_ref: self.encounter_ref,
            item_kind,
            item_id: self.item_id,
            lot_code: self.lot_code,
            quantity: self.quantity,
            note: self.note,
            occurred_at: self.occurred_at,
        })
    }
}

impl ConsumptionService {
    /// Create a new ConsumptionService instance
    pub fn new(db: PgPool, events: StockEvents) -> Self {
        Self { db, events }
    }

    /// Record a dispense and deduct it from its lot.
    ///
    /// The availability the caller saw on screen is not trusted: the
    /// decrement re-checks the precondition at the atomic write, and a lot
    /// that went away or ran short in the meantime fails the whole call.
    pub async fn consume(&self, input: RecordConsumptionInput) -> AppResult<ConsumptionResponse> {
        validate_quantity(input.quantity)
            .map_err(|e| AppError::InvalidQuantity(e.to_string()))?;

        let key = LotKey::new(input.item_kind, input.item_id, input.lot_code.clone()).map_err(
            |e| AppError::Validation {
                field: "lot_code".to_string(),
                message: e.to_string(),
                message_es: "el código de lote no corresponde al tipo de artículo".to_string(),
            },
        )?;

        let stock = StockService::new(self.db.clone());
        let mut tx = self.db.begin().await?;

        let new_quantity = stock
            .apply_delta(&mut *tx, &key, -input.quantity, None)
            .await?;

        let row = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            INSERT INTO consumption_records
                (encounter_ref, item_kind, item_id, lot_code, quantity, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, encounter_ref, item_kind, item_id, lot_code, quantity, note, occurred_at
            "#,
        )
        .bind(input.encounter_ref)
        .bind(key.item_kind.as_str())
        .bind(key.item_id)
        .bind(&key.lot_code)
        .bind(input.quantity)
        .bind(&input.note)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.events
            .publish(StockEventKind::Consumed, key, new_quantity);

        Ok(ConsumptionResponse {
            record: row.into_model()?,
            new_quantity,
        })
    }

    /// Reverse a recorded consumption: restore the originating lot and
    /// delete the record, atomically.
    ///
    /// When the originating lot row is gone the call fails with
    /// `OriginatingLotMissing` and the record is left intact for manual
    /// reconciliation.
    pub async fn reverse(&self, record_id: Uuid) -> AppResult<ReversalResponse> {
        let stock = StockService::new(self.db.clone());
        let mut tx = self.db.begin().await?;

        // Delete first: a concurrent reversal of the same record then
        // matches zero rows instead of restoring the lot twice.
        let row = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            DELETE FROM consumption_records
            WHERE id = $1
            RETURNING id, encounter_ref, item_kind, item_id, lot_code, quantity, note, occurred_at
            "#,
        )
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Consumption record".to_string()))?;

        let record = row.into_model()?;
        let key = record.lot_key();

        let new_quantity = match stock.apply_delta(&mut *tx, &key, record.quantity, None).await {
            Ok(quantity) => quantity,
            Err(AppError::UnknownLot(lot)) => return Err(AppError::OriginatingLotMissing(lot)),
            Err(e) => return Err(e),
        };

        tx.commit().await?;

        self.events
            .publish(StockEventKind::Reversed, key, new_quantity);

        Ok(ReversalResponse {
            reversed: record,
            new_quantity,
        })
    }

    /// Get one consumption record
    pub async fn get_record(&self, record_id: Uuid) -> AppResult<ConsumptionRecord> {
        let row = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            SELECT id, encounter_ref, item_kind, item_id, lot_code, quantity, note, occurred_at
            FROM consumption_records
            WHERE id = $1
            "#,
        )
        .bind(record_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Consumption record".to_string()))?;

        row.into_model()
    }

    /// List the consumptions tied to one encounter, oldest first.
    ///
    /// The clinical system walks this list to reverse every record before it
    /// removes an encounter; the cascade is its obligation, not the ledger's.
    pub async fn list_by_encounter(
        &self,
        encounter_ref: Uuid,
    ) -> AppResult<Vec<ConsumptionRecord>> {
        let rows = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            SELECT id, encounter_ref, item_kind, item_id, lot_code, quantity, note, occurred_at
            FROM consumption_records
            WHERE encounter_ref = $1
            ORDER BY occurred_at ASC, id ASC
            "#,
        )
        .bind(encounter_ref)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ConsumptionRow::into_model).collect()
    }
}
