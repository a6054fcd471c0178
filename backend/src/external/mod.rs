//! External API integrations

pub mod catalog;

pub use catalog::CatalogClient;
