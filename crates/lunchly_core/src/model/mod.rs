//! Domain model for restaurant customers and their reservations.
//!
//! # Responsibility
//! - Define the two record shapes persisted by the booking core.
//! - Own field-level validation that must run before any store I/O.
//!
//! # Invariants
//! - A record with `id == None` is transient; `Some(id)` means persisted.
//! - Reservations reference customers, never the reverse.

pub mod customer;
pub mod reservation;
