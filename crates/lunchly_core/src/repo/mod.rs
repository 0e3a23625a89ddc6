//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for customers and
//!   reservations.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Write paths validate records before touching the store.
//! - Read-path store failures surface as `RepoError::Fetch` with a stable
//!   message; the underlying cause is only logged.

pub mod customer_repo;
pub mod error;
pub mod reservation_repo;
mod schema;
