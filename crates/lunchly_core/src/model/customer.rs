//! Customer domain model.
//!
//! # Responsibility
//! - Represent one restaurant guest and their contact details.
//! - Validate required name fields before persistence.
//!
//! # Invariants
//! - `first_name` and `last_name` are non-empty whenever persisted.
//! - A non-empty `phone` is unique among persisted customers at create time.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned numeric customer identity.
pub type CustomerId = i64;

/// Validation failure for customer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerValidationError {
    /// First or last name is empty.
    MissingName,
}

impl Display for CustomerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "missing name"),
        }
    }
}

impl Error for CustomerValidationError {}

/// A restaurant customer.
///
/// Serialized with camelCase keys (`firstName`, `lastName`) to match the
/// shape route handlers already exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// `None` until the first successful save.
    pub id: Option<CustomerId>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl Customer {
    /// Creates a transient customer with no phone or notes.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            notes: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns `"<first> <last>"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Checks that both name fields are present.
    ///
    /// # Errors
    /// - `MissingName` when either name is empty.
    pub fn validate(&self) -> Result<(), CustomerValidationError> {
        if self.first_name.is_empty() || self.last_name.is_empty() {
            return Err(CustomerValidationError::MissingName);
        }
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Phone value that participates in the uniqueness rule.
    ///
    /// Empty strings are treated the same as an absent phone.
    pub fn normalized_phone(&self) -> Option<&str> {
        self.phone.as_deref().filter(|phone| !phone.is_empty())
    }
}
