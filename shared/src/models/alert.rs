//! Stock alert derivation
//!
//! Alerts are derived from a snapshot of the stock rows and are never stored;
//! deriving twice over unchanged stock yields identical reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::item::ItemKind;
use super::lot::StockLot;

/// Item whose aggregate availability is above zero but at or below the
/// configured reorder threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub available: i64,
}

/// Item that has been stocked before and is now at zero across all lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfStockAlert {
    pub item_kind: ItemKind,
    pub item_id: i32,
}

/// Medication lot past its expiry date with units still on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiredLotAlert {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub lot_code: String,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    pub location: String,
}

/// Full alert report for one derivation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertReport {
    pub low_stock: Vec<LowStockAlert>,
    pub out_of_stock: Vec<OutOfStockAlert>,
    pub expired_lots: Vec<ExpiredLotAlert>,
}

impl AlertReport {
    pub fn is_empty(&self) -> bool {
        self.low_stock.is_empty() && self.out_of_stock.is_empty() && self.expired_lots.is_empty()
    }
}

/// Derives the alert report from a stock snapshot.
///
/// Aggregates per item: zero on hand with at least one row is out-of-stock,
/// anything in `(0, threshold]` is low stock. Expired-lot alerts fire per lot
/// while it still holds units. Output ordering is by item then lot code, so
/// identical snapshots produce identical reports.
pub fn derive_alerts(lots: &[StockLot], threshold: i64, today: NaiveDate) -> AlertReport {
    let mut totals: BTreeMap<(ItemKind, i32), i64> = BTreeMap::new();
    for lot in lots {
        *totals.entry((lot.item_kind, lot.item_id)).or_insert(0) += i64::from(lot.quantity);
    }

    let mut low_stock = Vec::new();
    let mut out_of_stock = Vec::new();
    for ((item_kind, item_id), available) in totals {
        if available == 0 {
            out_of_stock.push(OutOfStockAlert { item_kind, item_id });
        } else if available <= threshold {
            low_stock.push(LowStockAlert {
                item_kind,
                item_id,
                available,
            });
        }
    }

    let mut expired_lots: Vec<ExpiredLotAlert> = lots
        .iter()
        .filter(|lot| lot.quantity > 0 && lot.is_expired_on(today))
        .filter_map(|lot| {
            let lot_code = lot.lot_code.clone()?;
            Some(ExpiredLotAlert {
                item_kind: lot.item_kind,
                item_id: lot.item_id,
                lot_code,
                expiry_date: lot.expiry_date?,
                quantity: lot.quantity,
                location: lot.location.clone(),
            })
        })
        .collect();
    expired_lots.sort_by(|a, b| {
        (a.item_kind, a.item_id, &a.lot_code).cmp(&(b.item_kind, b.item_id, &b.lot_code))
    });

    AlertReport {
        low_stock,
        out_of_stock,
        expired_lots,
    }
}
