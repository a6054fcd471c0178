//! HTTP handlers for the Veterinary Clinic Management Platform

pub mod alerts;
pub mod consumption;
pub mod events;
pub mod health;
pub mod prescriptions;
pub mod purchasing;
pub mod stock;

pub use alerts::*;
pub use consumption::*;
pub use events::*;
pub use health::*;
pub use prescriptions::*;
pub use purchasing::*;
pub use stock::*;
