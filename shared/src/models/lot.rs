//! Stock lot models and the union lot key

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::item::{ItemKind, ItemRef};

/// Union key addressing exactly one stock row.
///
/// Medication stock is keyed per supplier lot: `(medication, item_id, Some(lot_code))`.
/// Supply stock is pooled per item: `(supply, item_id, None)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LotKey {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub lot_code: Option<String>,
}

impl LotKey {
    /// Builds a key, rejecting shapes that mix up the two kinds.
    pub fn new(
        item_kind: ItemKind,
        item_id: i32,
        lot_code: Option<String>,
    ) -> Result<Self, &'static str> {
        match (item_kind, &lot_code) {
            (ItemKind::Medication, None) => Err("medication stock requires a lot code"),
            (ItemKind::Supply, Some(_)) => Err("supply stock does not carry lot codes"),
            _ => Ok(Self {
                item_kind,
                item_id,
                lot_code,
            }),
        }
    }

    pub fn medication(item_id: i32, lot_code: impl Into<String>) -> Self {
        Self {
            item_kind: ItemKind::Medication,
            item_id,
            lot_code: Some(lot_code.into()),
        }
    }

    pub fn supply(item_id: i32) -> Self {
        Self {
            item_kind: ItemKind::Supply,
            item_id,
            lot_code: None,
        }
    }

    pub fn item(&self) -> ItemRef {
        ItemRef::new(self.item_kind, self.item_id)
    }
}

impl fmt::Display for LotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lot_code {
            Some(code) => write!(f, "{}#{}/{}", self.item_kind, self.item_id, code),
            None => write!(f, "{}#{}", self.item_kind, self.item_id),
        }
    }
}

/// A quantity of one catalog item held at a clinic location.
///
/// Rows are created on first receipt and persist at quantity zero once
/// depleted, so depleted items stay distinguishable from items the clinic
/// never stocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLot {
    pub id: Uuid,
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub lot_code: Option<String>,
    pub location: String,
    pub quantity: i32,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockLot {
    pub fn key(&self) -> LotKey {
        LotKey {
            item_kind: self.item_kind,
            item_id: self.item_id,
            lot_code: self.lot_code.clone(),
        }
    }

    pub fn item(&self) -> ItemRef {
        ItemRef::new(self.item_kind, self.item_id)
    }

    /// A lot is expired when its expiry date is strictly before `today`.
    /// Lots expiring today are still usable.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date.map(|d| d < today).unwrap_or(false)
    }
}

/// Aggregate stock position of one catalog item across all of its lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAvailability {
    pub item_kind: ItemKind,
    pub item_id: i32,
    /// Number of stock rows ever created for the item, including depleted ones.
    pub lot_count: i64,
    /// Sum of on-hand quantities across those rows.
    pub available: i64,
}
