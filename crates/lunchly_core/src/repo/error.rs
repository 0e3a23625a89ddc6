//! Shared error type for customer and reservation repositories.

use crate::db::DbError;
use crate::model::customer::CustomerValidationError;
use crate::model::reservation::ReservationValidationError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

pub const FETCH_CUSTOMER_FAILED: &str = "An error occurred while fetching the customer.";
pub const FETCH_CUSTOMERS_FAILED: &str = "An error occurred while fetching customers.";
pub const FETCH_RESERVATIONS_FAILED: &str = "An error occurred while fetching reservations.";
pub const SAVE_RESERVATION_FAILED: &str = "An error occurred while saving the reservation.";

/// Repository error for customer/reservation persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// Customer fields failed validation; nothing was written.
    CustomerValidation(CustomerValidationError),
    /// Reservation fields failed validation; nothing was written.
    ReservationValidation(ReservationValidationError),
    /// Another customer already owns this phone number.
    DuplicatePhone(String),
    /// No row exists for the requested id.
    NotFound { entity: &'static str, id: i64 },
    /// Opaque store failure with a stable, user-facing message.
    Fetch(&'static str),
    /// Operation is not valid for the record's lifecycle state.
    InvalidState(&'static str),
    /// Raw store failure from the customer transactional save.
    Db(DbError),
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl RepoError {
    /// Whether the error was caused by caller input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::CustomerValidation(_) | Self::ReservationValidation(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CustomerValidation(err) => write!(f, "{err}"),
            Self::ReservationValidation(err) => write!(f, "{err}"),
            Self::DuplicatePhone(phone) => {
                write!(f, "a customer with phone number `{phone}` already exists")
            }
            Self::NotFound { entity, id } => write!(f, "no such {entity}: {id}"),
            Self::Fetch(message) => write!(f, "{message}"),
            Self::InvalidState(message) => write!(f, "invalid state: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CustomerValidation(err) => Some(err),
            Self::ReservationValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CustomerValidationError> for RepoError {
    fn from(value: CustomerValidationError) -> Self {
        Self::CustomerValidation(value)
    }
}

impl From<ReservationValidationError> for RepoError {
    fn from(value: ReservationValidationError) -> Self {
        Self::ReservationValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Logs `err` in full and replaces it with the stable `message`.
///
/// Used on paths whose callers must not see store internals.
pub(crate) fn mask_store_error(event: &str, err: RepoError, message: &'static str) -> RepoError {
    error!(
        "event={} module=repo status=error error_code=store_failure error={}",
        event, err
    );
    RepoError::Fetch(message)
}
