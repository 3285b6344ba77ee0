//! Domain Layer - service errors and read models

pub mod errors;
pub mod views;

pub use errors::ServiceError;
pub use views::ClientSummary;
