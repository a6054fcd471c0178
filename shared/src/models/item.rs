use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog item tracked by the stock ledger.
///
/// Medications are lot-tracked (every unit belongs to a labelled lot with an
/// expiry date); supplies are fungible and tracked as a single pooled
/// quantity per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Medication,
    Supply,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Medication => "medication",
            ItemKind::Supply => "supply",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "medication" => Some(ItemKind::Medication),
            "supply" => Some(ItemKind::Supply),
            _ => None,
        }
    }

    /// Whether lots of this kind carry a supplier lot code and expiry date.
    pub fn is_lot_tracked(&self) -> bool {
        matches!(self, ItemKind::Medication)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to an item in the clinic catalog.
///
/// The catalog itself (names, presentations, suppliers) is owned by another
/// service; the ledger stores only this typed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_kind: ItemKind,
    pub item_id: i32,
}

impl ItemRef {
    pub fn new(item_kind: ItemKind, item_id: i32) -> Self {
        Self { item_kind, item_id }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.item_kind, self.item_id)
    }
}
