//! Purchase receipt models (the stock intake audit trail)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::ItemKind;
use super::lot::LotKey;

/// Header of a recorded purchase. Lines carry the per-item detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    /// Sum of `quantity * unit_cost` over the receipt's lines.
    pub total_cost: Decimal,
}

/// One line of a purchase receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceiptLine {
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub lot_code: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl PurchaseReceiptLine {
    pub fn lot_key(&self) -> LotKey {
        LotKey {
            item_kind: self.item_kind,
            item_id: self.item_id,
            lot_code: self.lot_code.clone(),
        }
    }

    pub fn line_cost(&self) -> Decimal {
        self.unit_cost * Decimal::from(self.quantity)
    }
}
