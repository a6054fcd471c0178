//! Purchase intake service: the only path that increases stock
//!
//! A receipt is applied atomically. Every line lands or none does, and the
//! receipt rows double as the intake audit trail.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::events::{StockEventKind, StockEvents};
use crate::services::stock::{LotDefaults, StockService};
use shared::models::{ItemKind, LotKey, PurchaseReceipt, PurchaseReceiptLine};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_lot_shape, validate_quantity};

/// Purchase intake service
#[derive(Clone)]
pub struct PurchasingService {
    db: PgPool,
    events: StockEvents,
    default_location: String,
}

/// One line of an incoming receipt
#[derive(Debug, Deserialize)]
pub struct ReceiptLineInput {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub lot_code: Option<String>,
    pub expiry_date: Option<chrono::NaiveDate>,
}

/// Input for recording a purchase receipt
#[derive(Debug, Deserialize)]
pub struct RecordReceiptInput {
    pub lines: Vec<ReceiptLineInput>,
}

/// Updated lot position after a receipt line was applied
#[derive(Debug, Clone, Serialize)]
pub struct LotQuantity {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub lot_code: Option<String>,
    pub quantity: i32,
}

/// Response for a recorded receipt
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub receipt: PurchaseReceipt,
    pub lines: Vec<PurchaseReceiptLine>,
    pub lot_quantities: Vec<LotQuantity>,
}

/// Receipt with its lines, as stored
#[derive(Debug, Serialize)]
pub struct ReceiptDetail {
    pub receipt: PurchaseReceipt,
    pub lines: Vec<PurchaseReceiptLine>,
}

/// Database row for a receipt line
#[derive(Debug, FromRow)]
struct ReceiptLineRow {
    id: Uuid,
    receipt_id: Uuid,
    item_kind: String,
    item_id: i32,
    quantity: i32,
    unit_cost: Decimal,
    lot_code: Option<String>,
    expiry_date: Option<chrono::NaiveDate>,
}

impl ReceiptLineRow {
    fn into_model(self) -> AppResult<PurchaseReceiptLine> {
        let item_kind = ItemKind::from_str(&self.item_kind).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown item kind in receipt line: {}",
                self.item_kind
            ))
        })?;
        Ok(PurchaseReceiptLine {
            id: self.id,
            receipt_id: self.receipt_id,
            item_kind,
            item_id: self.item_id,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            lot_code: self.lot_code,
            expiry_date: self.expiry_date,
        })
    }
}

impl PurchasingService {
    /// Create a new PurchasingService instance
    pub fn new(db: PgPool, events: StockEvents, default_location: String) -> Self {
        Self {
            db,
            events,
            default_location,
        }
    }

    /// Record a purchase receipt and increment the affected lots.
    ///
    /// The header, every line and every stock increment commit together; a
    /// bad line rejects the whole receipt before anything is written.
    pub async fn record_receipt(&self, input: RecordReceiptInput) -> AppResult<ReceiptResponse> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "A receipt must have at least one line".to_string(),
                message_es: "El recibo debe tener al menos una línea".to_string(),
            });
        }

        for (idx, line) in input.lines.iter().enumerate() {
            let line_no = idx + 1;
            if let Err(e) = validate_quantity(line.quantity) {
                return Err(AppError::PartialBatchFailure {
                    line: line_no,
                    message: e.to_string(),
                    message_es: "la cantidad debe ser mayor que cero".to_string(),
                });
            }
            if line.unit_cost < Decimal::ZERO {
                return Err(AppError::PartialBatchFailure {
                    line: line_no,
                    message: "Unit cost must not be negative".to_string(),
                    message_es: "el costo unitario no puede ser negativo".to_string(),
                });
            }
            if let Err(e) =
                validate_lot_shape(line.item_kind, line.lot_code.as_deref(), line.expiry_date)
            {
                return Err(AppError::PartialBatchFailure {
                    line: line_no,
                    message: e.to_string(),
                    message_es: "el código de lote y la fecha de vencimiento no corresponden al tipo de artículo"
                        .to_string(),
                });
            }
        }

        let total_cost: Decimal = input
            .lines
            .iter()
            .map(|l| l.unit_cost * Decimal::from(l.quantity))
            .sum();

        let stock = StockService::new(self.db.clone());
        let mut tx = self.db.begin().await?;

        let receipt_row = sqlx::query_as::<_, (Uuid, DateTime<Utc>, Decimal)>(
            r#"
            INSERT INTO purchase_receipts (total_cost)
            VALUES ($1)
            RETURNING id, occurred_at, total_cost
            "#,
        )
        .bind(total_cost)
        .fetch_one(&mut *tx)
        .await?;

        let receipt = PurchaseReceipt {
            id: receipt_row.0,
            occurred_at: receipt_row.1,
            total_cost: receipt_row.2,
        };

        let mut lines = Vec::with_capacity(input.lines.len());
        let mut lot_quantities: Vec<LotQuantity> = Vec::new();
        for (idx, line) in input.lines.iter().enumerate() {
            let row = sqlx::query_as::<_, ReceiptLineRow>(
                r#"
                INSERT INTO purchase_receipt_lines
                    (receipt_id, line_no, item_kind, item_id, quantity, unit_cost, lot_code,
                     expiry_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, receipt_id, item_kind, item_id, quantity, unit_cost, lot_code,
                          expiry_date
                "#,
            )
            .bind(receipt.id)
            .bind((idx + 1) as i32)
            .bind(line.item_kind.as_str())
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(line.unit_cost)
            .bind(&line.lot_code)
            .bind(line.expiry_date)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(row.into_model()?);

            let key = LotKey {
                item_kind: line.item_kind,
                item_id: line.item_id,
                lot_code: line.lot_code.clone(),
            };
            let defaults = LotDefaults {
                location: self.default_location.clone(),
                expiry_date: line.expiry_date,
            };
            let quantity = stock
                .apply_delta(&mut *tx, &key, line.quantity, Some(&defaults))
                .await?;

            // Two lines for the same lot merge; keep the latest figure.
            lot_quantities.retain(|lq| {
                (lq.item_kind, lq.item_id, &lq.lot_code)
                    != (key.item_kind, key.item_id, &key.lot_code)
            });
            lot_quantities.push(LotQuantity {
                item_kind: key.item_kind,
                item_id: key.item_id,
                lot_code: key.lot_code,
                quantity,
            });
        }

        tx.commit().await?;

        for lq in &lot_quantities {
            self.events.publish(
                StockEventKind::Received,
                LotKey {
                    item_kind: lq.item_kind,
                    item_id: lq.item_id,
                    lot_code: lq.lot_code.clone(),
                },
                lq.quantity,
            );
        }

        Ok(ReceiptResponse {
            receipt,
            lines,
            lot_quantities,
        })
    }

    /// Get one receipt with its lines
    pub async fn get_receipt(&self, receipt_id: Uuid) -> AppResult<ReceiptDetail> {
        let receipt = sqlx::query_as::<_, (Uuid, DateTime<Utc>, Decimal)>(
            "SELECT id, occurred_at, total_cost FROM purchase_receipts WHERE id = $1",
        )
        .bind(receipt_id)
        .fetch_optional(&self.db)
        .await?
        .map(|row| PurchaseReceipt {
            id: row.0,
            occurred_at: row.1,
            total_cost: row.2,
        })
        .ok_or_else(|| AppError::NotFound("Receipt".to_string()))?;

        let lines = sqlx::query_as::<_, ReceiptLineRow>(
            r#"
            SELECT id, receipt_id, item_kind, item_id, quantity, unit_cost, lot_code, expiry_date
            FROM purchase_receipt_lines
            WHERE receipt_id = $1
            ORDER BY line_no
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(ReceiptLineRow::into_model)
        .collect::<AppResult<Vec<_>>>()?;

        Ok(ReceiptDetail { receipt, lines })
    }

    /// List receipts, newest first
    pub async fn list_receipts(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<PurchaseReceipt>> {
        if pagination.per_page == 0 || pagination.per_page > 100 {
            return Err(AppError::ValidationError(
                "per_page must be between 1 and 100".to_string(),
            ));
        }

        let total_items = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM purchase_receipts")
            .fetch_one(&self.db)
            .await?;

        let receipts = sqlx::query_as::<_, (Uuid, DateTime<Utc>, Decimal)>(
            r#"
            SELECT id, occurred_at, total_cost
            FROM purchase_receipts
            ORDER BY occurred_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|row| PurchaseReceipt {
            id: row.0,
            occurred_at: row.1,
            total_cost: row.2,
        })
        .collect();

        Ok(PaginatedResponse {
            data: receipts,
            pagination: PaginationMeta::new(&pagination, total_items as u64),
        })
    }
}
