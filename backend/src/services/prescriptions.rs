//! Prescription advisory service
//!
//! Prescribing is clinical intent, dispensing is the physical event. This
//! service therefore never touches a lot quantity: it reads the aggregate
//! position to warn the prescriber and persists the advisory record, even
//! when the prescriber overrides a shortage warning.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;
use shared::models::{
    evaluate_availability, AvailabilityEvaluation, AvailabilityStatus, ItemKind,
    PrescriptionRecord,
};
use shared::validation::{validate_duration_days, validate_quantity};

/// Prescription advisory service
#[derive(Clone)]
pub struct PrescriptionService {
    db: PgPool,
}

/// Input for an availability check
#[derive(Debug, Deserialize)]
pub struct EvaluateInput {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub quantity_requested: i32,
}

/// Input for recording a prescription
#[derive(Debug, Deserialize)]
pub struct RecordPrescriptionInput {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub quantity: i32,
    pub dose: Option<String>,
    pub frequency: Option<String>,
    pub duration_days: Option<i32>,
    pub instructions: Option<String>,
}

/// Database row for a prescription record
#[derive(Debug, FromRow)]
struct PrescriptionRow {
    id: Uuid,
    item_kind: String,
    item_id: i32,
    quantity: i32,
    dose: Option<String>,
    frequency: Option<String>,
    duration_days: Option<i32>,
    instructions: Option<String>,
    availability_status: String,
    available_quantity: i64,
    prescribed_at: DateTime<Utc>,
}

impl PrescriptionRow {
    fn into_model(self) -> AppResult<PrescriptionRecord> {
        let item_kind = ItemKind::from_str(&self.item_kind).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown item kind in prescription: {}",
                self.item_kind
            ))
        })?;
        let availability_status = AvailabilityStatus::from_str(&self.availability_status)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Unknown availability status in prescription: {}",
                    self.availability_status
                ))
            })?;
        Ok(PrescriptionRecord {
            id: self.id,
            item_kind,
            item_id: self.item_id,
            quantity: self.quantity,
            dose: self.dose,
            frequency: self.frequency,
            duration_days: self.duration_days,
            instructions: self.instructions,
            availability_status,
            available_quantity: self.available_quantity,
            prescribed_at: self.prescribed_at,
        })
    }
}

impl PrescriptionService {
    /// Create a new PrescriptionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Check how a requested quantity compares to current stock.
    ///
    /// Read-only by contract: any number of calls leaves every lot
    /// untouched. An item whose catalog entry is dangling still reports a
    /// status (`NO_EN_CLINICA` when it never had stock rows).
    pub async fn evaluate(&self, input: EvaluateInput) -> AppResult<AvailabilityEvaluation> {
        validate_quantity(input.quantity_requested)
            .map_err(|e| AppError::InvalidQuantity(e.to_string()))?;

        let stock = StockService::new(self.db.clone());
        let availability = stock.availability(input.item_kind, input.item_id).await?;

        Ok(evaluate_availability(&availability, input.quantity_requested))
    }

    /// Record a prescription with the advisory snapshot taken at write time.
    ///
    /// Never blocked by stock level; a shortage only shapes the snapshot.
    pub async fn record(&self, input: RecordPrescriptionInput) -> AppResult<PrescriptionRecord> {
        validate_quantity(input.quantity)
            .map_err(|e| AppError::InvalidQuantity(e.to_string()))?;
        validate_duration_days(input.duration_days).map_err(|e| AppError::Validation {
            field: "duration_days".to_string(),
            message: e.to_string(),
            message_es: "la duración del tratamiento debe ser un número positivo de días"
                .to_string(),
        })?;

        let evaluation = self
            .evaluate(EvaluateInput {
                item_kind: input.item_kind,
                item_id: input.item_id,
                quantity_requested: input.quantity,
            })
            .await?;

        let row = sqlx::query_as::<_, PrescriptionRow>(
            r#"
            INSERT INTO prescription_records
                (item_kind, item_id, quantity, dose, frequency, duration_days, instructions,
                 availability_status, available_quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, item_kind, item_id, quantity, dose, frequency, duration_days,
                      instructions, availability_status, available_quantity, prescribed_at
            "#,
        )
        .bind(input.item_kind.as_str())
        .bind(input.item_id)
        .bind(input.quantity)
        .bind(&input.dose)
        .bind(&input.frequency)
        .bind(input.duration_days)
        .bind(&input.instructions)
        .bind(evaluation.status.as_str())
        .bind(evaluation.available_quantity)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }
}
