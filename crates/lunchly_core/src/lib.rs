//! Core persistence logic for the Lunchly restaurant booking application.
//! This crate is the single source of truth for customer and reservation
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, DatabaseConfig, LoggingConfig, LunchlyConfig};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::customer::{Customer, CustomerId, CustomerValidationError};
pub use model::reservation::{
    Reservation, ReservationId, ReservationValidationError, MIN_GUESTS, STORED_START_AT_FORMAT,
};
pub use repo::customer_repo::{
    CustomerRepoOptions, CustomerRepository, SqliteCustomerRepository,
    TOP_CUSTOMERS_DEFAULT_LIMIT,
};
pub use repo::error::{RepoError, RepoResult};
pub use repo::reservation_repo::{ReservationRepository, SqliteReservationRepository};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
