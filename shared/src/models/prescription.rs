//! Prescription advisory models and availability classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::item::ItemKind;
use super::lot::ItemAvailability;

/// Stock availability of a catalog item, as shown to prescribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    /// At least one unit on hand.
    Disponible,
    /// Stocked in the past, currently at zero across all lots.
    Agotado,
    /// No stock row was ever created for the item.
    NoEnClinica,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Disponible => "DISPONIBLE",
            AvailabilityStatus::Agotado => "AGOTADO",
            AvailabilityStatus::NoEnClinica => "NO_EN_CLINICA",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DISPONIBLE" => Some(AvailabilityStatus::Disponible),
            "AGOTADO" => Some(AvailabilityStatus::Agotado),
            "NO_EN_CLINICA" => Some(AvailabilityStatus::NoEnClinica),
            _ => None,
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies an item from its aggregate stock position.
///
/// An item with no stock rows at all was never stocked (`NO_EN_CLINICA`);
/// rows summing to zero mean it ran out (`AGOTADO`).
pub fn classify_availability(lot_count: i64, available: i64) -> AvailabilityStatus {
    if lot_count == 0 {
        AvailabilityStatus::NoEnClinica
    } else if available == 0 {
        AvailabilityStatus::Agotado
    } else {
        AvailabilityStatus::Disponible
    }
}

/// Advisory result returned to prescribers. Never blocks prescribing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEvaluation {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub status: AvailabilityStatus,
    pub available_quantity: i64,
    pub quantity_requested: i32,
    /// Set when the requested quantity exceeds what is on hand.
    pub shortage: bool,
}

/// Evaluates a requested quantity against the current stock position.
pub fn evaluate_availability(
    availability: &ItemAvailability,
    quantity_requested: i32,
) -> AvailabilityEvaluation {
    AvailabilityEvaluation {
        item_kind: availability.item_kind,
        item_id: availability.item_id,
        status: classify_availability(availability.lot_count, availability.available),
        available_quantity: availability.available,
        quantity_requested,
        shortage: i64::from(quantity_requested) > availability.available,
    }
}

/// A recorded clinical intent to administer an item.
///
/// Advisory only: it references no lot, and recording one never moves stock.
/// The availability fields are a snapshot taken when the prescription was
/// written, kept for later review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub id: Uuid,
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub quantity: i32,
    pub dose: Option<String>,
    pub frequency: Option<String>,
    pub duration_days: Option<i32>,
    pub instructions: Option<String>,
    pub availability_status: AvailabilityStatus,
    pub available_quantity: i64,
    pub prescribed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(lot_count: i64, available: i64) -> ItemAvailability {
        ItemAvailability {
            item_kind: ItemKind::Medication,
            item_id: 7,
            lot_count,
            available,
        }
    }

    #[test]
    fn test_never_stocked_vs_depleted() {
        assert_eq!(
            classify_availability(0, 0),
            AvailabilityStatus::NoEnClinica
        );
        assert_eq!(classify_availability(2, 0), AvailabilityStatus::Agotado);
        assert_eq!(classify_availability(2, 9), AvailabilityStatus::Disponible);
    }

    #[test]
    fn test_shortage_flag() {
        let eval = evaluate_availability(&position(1, 5), 8);
        assert_eq!(eval.status, AvailabilityStatus::Disponible);
        assert!(eval.shortage);

        let eval = evaluate_availability(&position(1, 5), 5);
        assert!(!eval.shortage, "exact fit is not a shortage");
    }

    #[test]
    fn test_status_serializes_in_spanish() {
        let json = serde_json::to_string(&AvailabilityStatus::NoEnClinica).unwrap();
        assert_eq!(json, "\"NO_EN_CLINICA\"");
        assert_eq!(
            AvailabilityStatus::from_str("AGOTADO"),
            Some(AvailabilityStatus::Agotado)
        );
    }
}
