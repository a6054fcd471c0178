//! Shared types and models for the Veterinary Clinic Management Platform
//!
//! This crate contains the inventory-ledger domain model shared between the
//! backend and other components of the system: catalog item identity, stock
//! lots and the union lot key, consumption and prescription records, purchase
//! receipts, and the pure availability/alert classification logic.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
