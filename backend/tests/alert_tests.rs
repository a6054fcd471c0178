//! Alert deriver tests
//!
//! Tests for the low-stock / out-of-stock / expired-lot projection including:
//! - Threshold boundaries: at the threshold is low, one above is not
//! - Depleted vs never stocked: only items with rows can be out of stock
//! - Expired lots fire only while they still hold units
//! - Idempotence: deriving twice over the same snapshot is identical

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use shared::models::{derive_alerts, ItemKind, LotKey, StockLot};

// ============================================================================
// Snapshot Helpers
// ============================================================================

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lot(
    item_kind: ItemKind,
    item_id: i32,
    lot_code: Option<&str>,
    quantity: i32,
    expiry: Option<NaiveDate>,
) -> StockLot {
    StockLot {
        id: Uuid::new_v4(),
        item_kind,
        item_id,
        lot_code: lot_code.map(String::from),
        location: "Almacén Principal".to_string(),
        quantity,
        expiry_date: expiry,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Keep the first row per lot key, the uniqueness a real snapshot has.
fn dedup_by_key(lots: Vec<StockLot>) -> Vec<StockLot> {
    let mut seen: HashSet<LotKey> = HashSet::new();
    lots.into_iter()
        .filter(|l| seen.insert(l.key()))
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    const THRESHOLD: i64 = 10;

    /// At the threshold the item is low; one unit above it is not
    #[test]
    fn test_threshold_boundary() {
        let today = day(2025, 6, 15);

        let at = vec![lot(ItemKind::Supply, 3, None, 10, None)];
        let report = derive_alerts(&at, THRESHOLD, today);
        assert_eq!(report.low_stock.len(), 1);
        assert_eq!(report.low_stock[0].available, 10);
        assert!(report.out_of_stock.is_empty());

        let above = vec![lot(ItemKind::Supply, 3, None, 11, None)];
        let report = derive_alerts(&above, THRESHOLD, today);
        assert!(report.is_empty());
    }

    /// A depleted item is out of stock, and not low stock
    #[test]
    fn test_depleted_item_is_out_not_low() {
        let today = day(2025, 6, 15);
        let lots = vec![lot(ItemKind::Supply, 3, None, 0, None)];

        let report = derive_alerts(&lots, THRESHOLD, today);
        assert_eq!(report.out_of_stock.len(), 1);
        assert_eq!(report.out_of_stock[0].item_id, 3);
        assert!(report.low_stock.is_empty());
    }

    /// An item with no rows at all raises nothing
    #[test]
    fn test_never_stocked_item_is_silent() {
        let today = day(2025, 6, 15);
        assert!(derive_alerts(&[], THRESHOLD, today).is_empty());
    }

    /// Low stock aggregates across lots of the same item
    #[test]
    fn test_low_stock_aggregates_lots() {
        let today = day(2025, 6, 15);
        let lots = vec![
            lot(ItemKind::Medication, 7, Some("A"), 4, Some(day(2026, 1, 1))),
            lot(ItemKind::Medication, 7, Some("B"), 4, Some(day(2027, 1, 1))),
        ];

        let report = derive_alerts(&lots, THRESHOLD, today);
        assert_eq!(report.low_stock.len(), 1);
        assert_eq!(report.low_stock[0].available, 8);

        // a third lot pushes the aggregate over the threshold
        let mut topped = lots;
        topped.push(lot(
            ItemKind::Medication,
            7,
            Some("C"),
            5,
            Some(day(2027, 6, 1)),
        ));
        assert!(derive_alerts(&topped, THRESHOLD, today).low_stock.is_empty());
    }

    /// An expired lot holding units is flagged, on any later date
    #[test]
    fn test_expired_lot_with_units() {
        let lots = vec![lot(
            ItemKind::Medication,
            7,
            Some("OLD"),
            3,
            Some(day(2020, 1, 1)),
        )];

        for today in [day(2020, 1, 2), day(2021, 7, 1), day(2099, 12, 31)] {
            let report = derive_alerts(&lots, THRESHOLD, today);
            assert_eq!(report.expired_lots.len(), 1);
            assert_eq!(report.expired_lots[0].lot_code, "OLD");
            assert_eq!(report.expired_lots[0].quantity, 3);
        }
    }

    /// The same lot at quantity zero is not flagged as expired
    #[test]
    fn test_depleted_expired_lot_not_flagged() {
        let today = day(2025, 6, 15);
        let lots = vec![lot(
            ItemKind::Medication,
            7,
            Some("OLD"),
            0,
            Some(day(2020, 1, 1)),
        )];

        let report = derive_alerts(&lots, THRESHOLD, today);
        assert!(report.expired_lots.is_empty(), "nothing left to act on");
        assert!(report.low_stock.is_empty());
        // the item itself reads as depleted, which is the item-level alert
        assert_eq!(report.out_of_stock.len(), 1);
    }

    /// Expiring today is still usable; strictly before today is expired
    #[test]
    fn test_expiry_is_strict() {
        let today = day(2025, 6, 15);
        let lots = vec![
            lot(ItemKind::Medication, 1, Some("TODAY"), 2, Some(today)),
            lot(
                ItemKind::Medication,
                2,
                Some("YESTERDAY"),
                2,
                Some(day(2025, 6, 14)),
            ),
        ];

        let report = derive_alerts(&lots, THRESHOLD, today);
        assert_eq!(report.expired_lots.len(), 1);
        assert_eq!(report.expired_lots[0].lot_code, "YESTERDAY");
    }

    /// Low stock and expired can co-occur for the same item
    #[test]
    fn test_low_and_expired_co_occur() {
        let today = day(2025, 6, 15);
        let lots = vec![lot(
            ItemKind::Medication,
            7,
            Some("OLD"),
            3,
            Some(day(2024, 1, 1)),
        )];

        let report = derive_alerts(&lots, THRESHOLD, today);
        assert_eq!(report.low_stock.len(), 1);
        assert_eq!(report.expired_lots.len(), 1);
        assert!(report.out_of_stock.is_empty());
    }

    /// Supplies carry no expiry and never show up as expired
    #[test]
    fn test_supplies_never_expire() {
        let today = day(2099, 1, 1);
        let lots = vec![lot(ItemKind::Supply, 3, None, 2, None)];

        let report = derive_alerts(&lots, THRESHOLD, today);
        assert!(report.expired_lots.is_empty());
        assert_eq!(report.low_stock.len(), 1);
    }

    /// Deriving twice with no intervening change yields identical reports
    #[test]
    fn test_derivation_idempotent() {
        let today = day(2025, 6, 15);
        let lots = vec![
            lot(ItemKind::Medication, 7, Some("A"), 2, Some(day(2024, 1, 1))),
            lot(ItemKind::Supply, 3, None, 0, None),
            lot(ItemKind::Supply, 4, None, 25, None),
        ];

        let first = derive_alerts(&lots, THRESHOLD, today);
        let second = derive_alerts(&lots, THRESHOLD, today);
        assert_eq!(first, second);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn today() -> NaiveDate {
        day(2025, 6, 15)
    }

    /// Strategy for one stock row of either kind
    fn lot_strategy() -> impl Strategy<Value = StockLot> {
        (
            any::<bool>(),
            1i32..=8,
            0i32..=30,
            0u32..=3000,
            0usize..=500,
        )
            .prop_map(|(is_medication, item_id, quantity, days_back, code_n)| {
                if is_medication {
                    // expiry scattered around today, before and after
                    let expiry = today() + chrono::Duration::days(i64::from(days_back) - 1500);
                    lot(
                        ItemKind::Medication,
                        item_id,
                        Some(&format!("LOT-{}", code_n)),
                        quantity,
                        Some(expiry),
                    )
                } else {
                    lot(ItemKind::Supply, item_id, None, quantity, None)
                }
            })
    }

    /// Strategy for a snapshot with unique lot keys
    fn snapshot_strategy() -> impl Strategy<Value = Vec<StockLot>> {
        prop::collection::vec(lot_strategy(), 0..25).prop_map(dedup_by_key)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Re-deriving over the same snapshot yields the identical report
        #[test]
        fn prop_idempotent(lots in snapshot_strategy(), threshold in 1i64..=50) {
            let first = derive_alerts(&lots, threshold, today());
            let second = derive_alerts(&lots, threshold, today());
            prop_assert_eq!(first, second);
        }

        /// Row order in the snapshot does not change the report
        #[test]
        fn prop_order_invariant(lots in snapshot_strategy(), threshold in 1i64..=50) {
            let report = derive_alerts(&lots, threshold, today());

            let mut reversed = lots.clone();
            reversed.reverse();
            prop_assert_eq!(derive_alerts(&reversed, threshold, today()), report);
        }

        /// Each item lands in exactly the category its aggregate dictates
        #[test]
        fn prop_items_partition_by_aggregate(
            lots in snapshot_strategy(),
            threshold in 1i64..=50
        ) {
            let report = derive_alerts(&lots, threshold, today());

            let mut totals: HashMap<(ItemKind, i32), i64> = HashMap::new();
            for l in &lots {
                *totals.entry((l.item_kind, l.item_id)).or_insert(0) += i64::from(l.quantity);
            }

            let low: HashSet<_> = report
                .low_stock
                .iter()
                .map(|a| (a.item_kind, a.item_id))
                .collect();
            let out: HashSet<_> = report
                .out_of_stock
                .iter()
                .map(|a| (a.item_kind, a.item_id))
                .collect();

            for (item, total) in &totals {
                prop_assert_eq!(out.contains(item), *total == 0);
                prop_assert_eq!(low.contains(item), *total > 0 && *total <= threshold);
            }
            // and never both at once
            prop_assert!(low.is_disjoint(&out));
        }

        /// Every low-stock figure is within (0, threshold]
        #[test]
        fn prop_low_stock_bounds(lots in snapshot_strategy(), threshold in 1i64..=50) {
            let report = derive_alerts(&lots, threshold, today());
            for alert in &report.low_stock {
                prop_assert!(alert.available > 0);
                prop_assert!(alert.available <= threshold);
            }
        }

        /// Expired alerts always hold units and a date strictly before today
        #[test]
        fn prop_expired_lots_hold_units(lots in snapshot_strategy(), threshold in 1i64..=50) {
            let report = derive_alerts(&lots, threshold, today());
            for alert in &report.expired_lots {
                prop_assert!(alert.quantity > 0);
                prop_assert!(alert.expiry_date < today());
            }
        }

        /// An out-of-stock item cannot also have an expired lot: expired
        /// requires units on hand, out-of-stock requires none
        #[test]
        fn prop_out_of_stock_disjoint_from_expired(
            lots in snapshot_strategy(),
            threshold in 1i64..=50
        ) {
            let report = derive_alerts(&lots, threshold, today());
            let out: HashSet<_> = report
                .out_of_stock
                .iter()
                .map(|a| (a.item_kind, a.item_id))
                .collect();

            for alert in &report.expired_lots {
                prop_assert!(!out.contains(&(alert.item_kind, alert.item_id)));
            }
        }
    }
}
