//! Purchase intake tests
//!
//! Tests for receipt handling including:
//! - Lot key construction per item kind (medication vs supply lines)
//! - Receipt cost math: total = sum of quantity x unit cost
//! - All-or-nothing batches: one bad line rejects the whole receipt
//! - Scenario: a two-line receipt lands both lots at their full quantities

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use shared::models::{ItemKind, LotKey};
use shared::validation::{validate_lot_shape, validate_quantity};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Intake Simulation
// ============================================================================

/// One line of an incoming receipt, as the supplier submits it.
#[derive(Debug, Clone)]
pub struct LineInput {
    pub item_kind: ItemKind,
    pub item_id: i32,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub lot_code: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl LineInput {
    fn medication(item_id: i32, lot_code: &str, quantity: i32, cost: Decimal, expiry: NaiveDate) -> Self {
        Self {
            item_kind: ItemKind::Medication,
            item_id,
            quantity,
            unit_cost: cost,
            lot_code: Some(lot_code.to_string()),
            expiry_date: Some(expiry),
        }
    }

    fn supply(item_id: i32, quantity: i32, cost: Decimal) -> Self {
        Self {
            item_kind: ItemKind::Supply,
            item_id,
            quantity,
            unit_cost: cost,
            lot_code: None,
            expiry_date: None,
        }
    }

    fn lot_key(&self) -> LotKey {
        LotKey {
            item_kind: self.item_kind,
            item_id: self.item_id,
            lot_code: self.lot_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    EmptyReceipt,
    LineFailure { line: usize },
}

/// In-memory stand-in for the intake transaction.
///
/// Lines are checked up front and then applied to a scratch copy that
/// replaces the live map only when every line landed, so a failure anywhere
/// leaves the ledger exactly as it was.
#[derive(Default)]
pub struct IntakeModel {
    lots: HashMap<LotKey, i32>,
}

impl IntakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive(&mut self, lines: &[LineInput]) -> Result<Vec<(LotKey, i32)>, IntakeError> {
        if lines.is_empty() {
            return Err(IntakeError::EmptyReceipt);
        }
        for (idx, line) in lines.iter().enumerate() {
            let valid = validate_quantity(line.quantity).is_ok()
                && line.unit_cost >= Decimal::ZERO
                && validate_lot_shape(line.item_kind, line.lot_code.as_deref(), line.expiry_date)
                    .is_ok();
            if !valid {
                return Err(IntakeError::LineFailure { line: idx + 1 });
            }
        }

        let mut staged = self.lots.clone();
        let mut updated: Vec<(LotKey, i32)> = Vec::new();
        for line in lines {
            let key = line.lot_key();
            let entry = staged.entry(key.clone()).or_insert(0);
            *entry += line.quantity;
            // Two lines for the same lot merge; keep the latest figure.
            let quantity = *entry;
            updated.retain(|(k, _)| *k != key);
            updated.push((key, quantity));
        }
        self.lots = staged;
        Ok(updated)
    }

    pub fn quantity(&self, key: &LotKey) -> Option<i32> {
        self.lots.get(key).copied()
    }

    pub fn availability(&self, item_kind: ItemKind, item_id: i32) -> i64 {
        self.lots
            .iter()
            .filter(|(k, _)| k.item_kind == item_kind && k.item_id == item_id)
            .map(|(_, q)| i64::from(*q))
            .sum()
    }
}

/// Receipt total: sum of quantity x unit cost over the lines.
pub fn receipt_total(lines: &[LineInput]) -> Decimal {
    lines
        .iter()
        .map(|l| l.unit_cost * Decimal::from(l.quantity))
        .sum()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Medication lines key on item + lot code, supply lines on item alone
    #[test]
    fn test_lot_key_construction() {
        let med = LineInput::medication(7, "L200", 20, dec("4.50"), day(2099, 1, 1));
        assert_eq!(med.lot_key(), LotKey::medication(7, "L200"));

        let sup = LineInput::supply(3, 50, dec("0.80"));
        assert_eq!(sup.lot_key(), LotKey::supply(3));
        assert_eq!(sup.lot_key().lot_code, None);
    }

    /// Two-line receipt: both lots land at their full quantities
    #[test]
    fn test_two_line_receipt_lands_both_lots() {
        let mut intake = IntakeModel::new();
        let lines = vec![
            LineInput::medication(7, "L200", 20, dec("4.50"), day(2099, 1, 1)),
            LineInput::supply(3, 50, dec("0.80")),
        ];

        let updated = intake.receive(&lines).unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(intake.availability(ItemKind::Medication, 7), 20);
        assert_eq!(intake.availability(ItemKind::Supply, 3), 50);
    }

    /// Receipt total is the sum of line costs
    #[test]
    fn test_receipt_total() {
        let lines = vec![
            LineInput::medication(7, "L200", 20, dec("4.50"), day(2099, 1, 1)),
            LineInput::supply(3, 50, dec("0.80")),
        ];
        // 20 * 4.50 + 50 * 0.80 = 90 + 40
        assert_eq!(receipt_total(&lines), dec("130.00"));
    }

    /// A medication line without lot code or expiry fails its line number
    #[test]
    fn test_medication_line_requires_lot_identity() {
        let mut intake = IntakeModel::new();
        let mut bad = LineInput::medication(7, "L200", 20, dec("4.50"), day(2099, 1, 1));
        bad.lot_code = None;

        let lines = vec![LineInput::supply(3, 50, dec("0.80")), bad];
        assert_eq!(
            intake.receive(&lines),
            Err(IntakeError::LineFailure { line: 2 })
        );
    }

    /// A supply line carrying a lot code fails
    #[test]
    fn test_supply_line_rejects_lot_code() {
        let mut intake = IntakeModel::new();
        let mut bad = LineInput::supply(3, 50, dec("0.80"));
        bad.lot_code = Some("X".to_string());

        assert_eq!(
            intake.receive(&[bad]),
            Err(IntakeError::LineFailure { line: 1 })
        );
    }

    /// One bad line rejects the whole receipt: no lot moves
    #[test]
    fn test_bad_line_rolls_back_whole_receipt() {
        let mut intake = IntakeModel::new();
        intake
            .receive(&[LineInput::supply(3, 10, dec("0.80"))])
            .unwrap();

        let lines = vec![
            LineInput::supply(3, 50, dec("0.80")),
            LineInput::supply(4, 0, dec("1.00")), // zero quantity
        ];
        assert_eq!(
            intake.receive(&lines),
            Err(IntakeError::LineFailure { line: 2 })
        );

        // first line must not have been applied
        assert_eq!(intake.availability(ItemKind::Supply, 3), 10);
        assert_eq!(intake.availability(ItemKind::Supply, 4), 0);
    }

    /// Negative unit cost is a line failure
    #[test]
    fn test_negative_unit_cost_rejected() {
        let mut intake = IntakeModel::new();
        let bad = LineInput::supply(3, 5, dec("-0.01"));
        assert_eq!(
            intake.receive(&[bad]),
            Err(IntakeError::LineFailure { line: 1 })
        );
    }

    /// Zero-cost lines are fine (donated samples still move stock)
    #[test]
    fn test_zero_cost_line_accepted() {
        let mut intake = IntakeModel::new();
        intake
            .receive(&[LineInput::supply(3, 5, Decimal::ZERO)])
            .unwrap();
        assert_eq!(intake.availability(ItemKind::Supply, 3), 5);
    }

    /// An empty receipt is rejected outright
    #[test]
    fn test_empty_receipt_rejected() {
        let mut intake = IntakeModel::new();
        assert_eq!(intake.receive(&[]), Err(IntakeError::EmptyReceipt));
    }

    /// Two lines for the same supply pool into one row
    #[test]
    fn test_duplicate_lines_merge() {
        let mut intake = IntakeModel::new();
        let lines = vec![
            LineInput::supply(3, 30, dec("0.80")),
            LineInput::supply(3, 20, dec("0.75")),
        ];

        let updated = intake.receive(&lines).unwrap();
        assert_eq!(updated.len(), 1, "same key reports one final figure");
        assert_eq!(updated[0].1, 50);
        assert_eq!(intake.availability(ItemKind::Supply, 3), 50);
    }

    /// Re-receipt of a known medication lot increments the same row
    #[test]
    fn test_re_receipt_same_medication_lot() {
        let mut intake = IntakeModel::new();
        let expiry = day(2099, 1, 1);
        intake
            .receive(&[LineInput::medication(7, "L200", 20, dec("4.50"), expiry)])
            .unwrap();
        intake
            .receive(&[LineInput::medication(7, "L200", 15, dec("4.60"), expiry)])
            .unwrap();

        assert_eq!(intake.quantity(&LotKey::medication(7, "L200")), Some(35));
        assert_eq!(intake.availability(ItemKind::Medication, 7), 35);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for valid line quantities
    fn quantity_strategy() -> impl Strategy<Value = i32> {
        1i32..=1000
    }

    /// Strategy for unit costs (0.00 to 500.00)
    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=50000).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for a valid line of either kind
    fn line_strategy() -> impl Strategy<Value = LineInput> {
        (
            any::<bool>(),
            1i32..=20,
            quantity_strategy(),
            cost_strategy(),
            1u32..=12,
        )
            .prop_map(|(is_medication, item_id, quantity, unit_cost, month)| {
                if is_medication {
                    LineInput::medication(
                        item_id,
                        &format!("LOT-{}", item_id),
                        quantity,
                        unit_cost,
                        day(2099, month, 1),
                    )
                } else {
                    LineInput::supply(item_id, quantity, unit_cost)
                }
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Receipt total always equals the line-by-line sum
        #[test]
        fn prop_receipt_total_matches_lines(
            lines in prop::collection::vec(line_strategy(), 1..10)
        ) {
            let expected: Decimal = lines
                .iter()
                .fold(Decimal::ZERO, |acc, l| acc + l.unit_cost * Decimal::from(l.quantity));
            prop_assert_eq!(receipt_total(&lines), expected);
        }

        /// A valid batch adds exactly the sum of its quantities per item
        #[test]
        fn prop_valid_batch_adds_quantities(
            lines in prop::collection::vec(line_strategy(), 1..10)
        ) {
            let mut intake = IntakeModel::new();
            intake.receive(&lines).unwrap();

            let mut expected: HashMap<(ItemKind, i32), i64> = HashMap::new();
            for line in &lines {
                *expected.entry((line.item_kind, line.item_id)).or_insert(0) +=
                    i64::from(line.quantity);
            }

            for ((item_kind, item_id), total) in expected {
                prop_assert_eq!(intake.availability(item_kind, item_id), total);
            }
        }

        /// A bad line anywhere makes the whole batch a no-op
        #[test]
        fn prop_bad_line_is_total_rollback(
            lines in prop::collection::vec(line_strategy(), 1..8),
            bad_position in 0usize..8
        ) {
            let mut intake = IntakeModel::new();
            // seed some stock so the rollback has something to preserve
            intake
                .receive(&[LineInput::supply(99, 7, dec("1.00"))])
                .unwrap();

            let mut batch = lines.clone();
            let position = bad_position.min(batch.len());
            batch.insert(position, LineInput::supply(98, -5, dec("1.00")));

            let result = intake.receive(&batch);
            prop_assert_eq!(result, Err(IntakeError::LineFailure { line: position + 1 }));

            // nothing moved, including lots named by the valid lines
            prop_assert_eq!(intake.availability(ItemKind::Supply, 99), 7);
            for line in &lines {
                prop_assert_eq!(intake.availability(line.item_kind, line.item_id), 0);
            }
        }

        /// Applying the same batch twice doubles every quantity
        #[test]
        fn prop_repeat_batch_doubles(
            lines in prop::collection::vec(line_strategy(), 1..6)
        ) {
            let mut once = IntakeModel::new();
            once.receive(&lines).unwrap();

            let mut twice = IntakeModel::new();
            twice.receive(&lines).unwrap();
            twice.receive(&lines).unwrap();

            for line in &lines {
                prop_assert_eq!(
                    twice.availability(line.item_kind, line.item_id),
                    2 * once.availability(line.item_kind, line.item_id)
                );
            }
        }
    }
}
