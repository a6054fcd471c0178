//! Validation utilities for the Veterinary Clinic Management Platform
//!
//! Field-level checks shared by every write path of the stock ledger. The
//! ledger's own non-negativity invariant is enforced at the database, not
//! here; these functions reject requests that are malformed before they
//! reach it.

use chrono::NaiveDate;

use crate::models::ItemKind;

// ============================================================================
// Stock Ledger Validations
// ============================================================================

/// Validate a consumed/received/prescribed quantity (strictly positive)
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Validate a ledger delta (zero moves nothing and is rejected)
pub fn validate_delta(delta: i32) -> Result<(), &'static str> {
    if delta == 0 {
        return Err("Stock delta must be non-zero");
    }
    Ok(())
}

/// Validate a supplier lot code (non-blank, no surrounding whitespace, <= 64 chars)
pub fn validate_lot_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Lot code must not be empty");
    }
    if code.len() > 64 {
        return Err("Lot code must be at most 64 characters");
    }
    if code.trim() != code {
        return Err("Lot code must not have surrounding whitespace");
    }
    Ok(())
}

/// Validate a storage location label
pub fn validate_location(location: &str) -> Result<(), &'static str> {
    if location.trim().is_empty() {
        return Err("Location must not be empty");
    }
    if location.len() > 120 {
        return Err("Location must be at most 120 characters");
    }
    Ok(())
}

// ============================================================================
// Kind-Shape Validations
// ============================================================================

/// Validate that lot code and expiry match the item kind.
///
/// Medication stock is lot-tracked: both a lot code and an expiry date are
/// required at intake. Supply stock is pooled: neither is allowed.
pub fn validate_lot_shape(
    item_kind: ItemKind,
    lot_code: Option<&str>,
    expiry_date: Option<NaiveDate>,
) -> Result<(), &'static str> {
    match item_kind {
        ItemKind::Medication => {
            let code = lot_code.ok_or("Medication intake requires a lot code")?;
            validate_lot_code(code)?;
            if expiry_date.is_none() {
                return Err("Medication intake requires an expiry date");
            }
        }
        ItemKind::Supply => {
            if lot_code.is_some() {
                return Err("Supply stock does not carry lot codes");
            }
            if expiry_date.is_some() {
                return Err("Supply stock does not carry expiry dates");
            }
        }
    }
    Ok(())
}

// ============================================================================
// Prescription Validations
// ============================================================================

/// Validate an optional treatment duration in days
pub fn validate_duration_days(duration_days: Option<i32>) -> Result<(), &'static str> {
    match duration_days {
        Some(days) if days <= 0 => Err("Treatment duration must be a positive number of days"),
        _ => Ok(()),
    }
}
