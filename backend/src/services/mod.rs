//! Business logic services for the Veterinary Clinic Management Platform

pub mod alerts;
pub mod consumption;
pub mod events;
pub mod prescriptions;
pub mod purchasing;
pub mod stock;

pub use alerts::AlertService;
pub use consumption::ConsumptionService;
pub use events::StockEvents;
pub use prescriptions::PrescriptionService;
pub use purchasing::PurchasingService;
pub use stock::StockService;
