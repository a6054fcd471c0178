//! Consumption records tying stock deductions to patient encounters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::ItemKind;
use super::lot::LotKey;

/// One recorded use of stock during a patient encounter.
///
/// Each record corresponds to exactly one applied stock deduction; reversing
/// the record restores the originating lot and deletes the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub id: Uuid,
    /// Opaque reference to the patient encounter, owned by the clinical system.
    pub encounter_ref: Uuid,
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub lot_code: Option<String>,
    pub quantity: i32,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ConsumptionRecord {
    /// Key of the lot this record deducted from.
    pub fn lot_key(&self) -> LotKey {
        LotKey {
            item_kind: self.item_kind,
            item_id: self.item_id,
            lot_code: self.lot_code.clone(),
        }
    }
}
