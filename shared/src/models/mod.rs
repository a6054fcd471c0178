//! Domain models for the Veterinary Clinic Management Platform

mod alert;
mod consumption;
mod item;
mod lot;
mod prescription;
mod purchase;

pub use alert::*;
pub use consumption::*;
pub use item::*;
pub use lot::*;
pub use prescription::*;
pub use purchase::*;
