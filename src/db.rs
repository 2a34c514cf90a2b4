pub mod error;
pub mod measurement_repository;
pub mod models;
pub mod schema;

pub use error::DbError;
pub use measurement_repository::MeasurementRepository;
pub use models::*;
