//! Customer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide listing, name search and reservation-count ranking.
//! - Own the transactional create-or-update of one customer, including the
//!   duplicate-phone rule.
//!
//! # Invariants
//! - `save` validates before opening a transaction; invalid input never
//!   reaches the store.
//! - Duplicate check and insert run inside one IMMEDIATE transaction; any
//!   failure rolls back and leaves `Customer::id` untouched.
//! - Phone uniqueness is checked on create only, unless
//!   `CustomerRepoOptions::recheck_phone_on_update` is set.
//! - Name search folds case with full Unicode rules on both sides of the
//!   comparison.
//! - Read-path store failures are masked with a stable message; save-path
//!   store failures propagate as `RepoError::Db`.

use crate::db::functions::{register_functions, UNICODE_LOWER};
use crate::model::customer::{Customer, CustomerId};
use crate::model::reservation::Reservation;
use crate::repo::error::{
    mask_store_error, RepoError, RepoResult, FETCH_CUSTOMERS_FAILED, FETCH_CUSTOMER_FAILED,
    FETCH_RESERVATIONS_FAILED,
};
use crate::repo::reservation_repo::{ReservationRepository, SqliteReservationRepository};
use crate::repo::schema::ensure_table_columns;
use log::{debug, error, info, warn};
use rusqlite::{
    params, Connection, OptionalExtension, Row, ToSql, Transaction, TransactionBehavior,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Row count returned by the ranking query when the caller gives no limit.
pub const TOP_CUSTOMERS_DEFAULT_LIMIT: u32 = 10;

const CUSTOMER_COLUMNS: &[&str] = &["id", "first_name", "last_name", "phone", "notes"];
const RESERVATION_JOIN_COLUMNS: &[&str] = &["id", "customer_id"];

const CUSTOMER_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    phone,
    notes
FROM customers";

/// Behavior switches for customer writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerRepoOptions {
    /// Also reject an update whose phone belongs to a different customer.
    pub recheck_phone_on_update: bool,
}

/// Repository interface for customer operations.
pub trait CustomerRepository {
    /// All customers ordered by `(last_name, first_name)`.
    fn list_all(&self) -> RepoResult<Vec<Customer>>;
    /// Case-insensitive substring match on first or last name.
    fn search(&self, name_part: &str) -> RepoResult<Vec<Customer>>;
    /// Customers with at least one reservation, busiest first.
    ///
    /// `None` or `Some(0)` falls back to [`TOP_CUSTOMERS_DEFAULT_LIMIT`].
    fn find_top_by_reservation_count(&self, limit: Option<u32>) -> RepoResult<Vec<Customer>>;
    fn get_by_id(&self, id: CustomerId) -> RepoResult<Customer>;
    /// Reservations held by a persisted customer.
    fn get_reservations(&self, customer: &Customer) -> RepoResult<Vec<Reservation>>;
    /// Inserts a transient customer (assigning its id) or updates a
    /// persisted one in place.
    fn save(&mut self, customer: &mut Customer) -> RepoResult<()>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn mut Connection,
    options: CustomerRepoOptions,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Constructs a repository with default options.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        Self::with_options(conn, CustomerRepoOptions::default())
    }

    /// Constructs a repository from a migrated/ready connection.
    pub fn with_options(
        conn: &'conn mut Connection,
        options: CustomerRepoOptions,
    ) -> RepoResult<Self> {
        ensure_table_columns(conn, "customers", CUSTOMER_COLUMNS)?;
        ensure_table_columns(conn, "reservations", RESERVATION_JOIN_COLUMNS)?;
        register_functions(conn)?;
        Ok(Self { conn, options })
    }

    pub fn options(&self) -> CustomerRepoOptions {
        self.options
    }

    fn query_customers(&self, sql: &str, params: &[&dyn ToSql]) -> RepoResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }
        Ok(customers)
    }

    fn read_many(
        &self,
        event: &str,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> RepoResult<Vec<Customer>> {
        let customers = self
            .query_customers(sql, params)
            .map_err(|err| mask_store_error(event, err, FETCH_CUSTOMERS_FAILED))?;
        debug!(
            "event={} module=repo status=ok count={}",
            event,
            customers.len()
        );
        Ok(customers)
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn list_all(&self) -> RepoResult<Vec<Customer>> {
        self.read_many(
            "customer_list",
            &format!("{CUSTOMER_SELECT_SQL} ORDER BY last_name ASC, first_name ASC, id ASC;"),
            &[],
        )
    }

    fn search(&self, name_part: &str) -> RepoResult<Vec<Customer>> {
        let pattern = format!("%{}%", name_part.to_lowercase());
        self.read_many(
            "customer_search",
            &format!(
                "{CUSTOMER_SELECT_SQL}
                 WHERE {UNICODE_LOWER}(first_name) LIKE ?1
                    OR {UNICODE_LOWER}(last_name) LIKE ?1
                 ORDER BY last_name ASC, first_name ASC, id ASC;"
            ),
            &[&pattern],
        )
    }

    fn find_top_by_reservation_count(&self, limit: Option<u32>) -> RepoResult<Vec<Customer>> {
        let limit = normalize_top_limit(limit);
        self.read_many(
            "customer_top",
            "SELECT
                c.id,
                c.first_name,
                c.last_name,
                c.phone,
                c.notes,
                COUNT(r.id) AS reservation_count
             FROM customers c
             INNER JOIN reservations r ON r.customer_id = c.id
             GROUP BY c.id
             ORDER BY reservation_count DESC, c.id ASC
             LIMIT ?1;",
            &[&limit],
        )
    }

    fn get_by_id(&self, id: CustomerId) -> RepoResult<Customer> {
        let found = self
            .query_customers(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"), &[&id])
            .map_err(|err| mask_store_error("customer_get", err, FETCH_CUSTOMER_FAILED))?;

        found.into_iter().next().ok_or(RepoError::NotFound {
            entity: "customer",
            id,
        })
    }

    fn get_reservations(&self, customer: &Customer) -> RepoResult<Vec<Reservation>> {
        let customer_id = customer.id.ok_or(RepoError::InvalidState(
            "customer must be saved before loading reservations",
        ))?;

        let reservations = SqliteReservationRepository::try_new(&*self.conn)
            .map_err(|err| mask_store_error("reservation_list", err, FETCH_RESERVATIONS_FAILED))?;
        reservations.get_reservations_for_customer(customer_id)
    }

    fn save(&mut self, customer: &mut Customer) -> RepoResult<()> {
        customer.validate()?;

        let started_at = Instant::now();
        let op = if customer.id.is_some() { "update" } else { "insert" };
        let options = self.options;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = match customer.id {
            None => create_in_tx(&tx, customer),
            Some(id) => update_in_tx(&tx, id, customer, options).map(|()| id),
        };

        let id = match outcome {
            Ok(id) => id,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=customer_save module=repo status=error op={} error_code=rollback_failed error={}",
                        op, rollback_err
                    );
                }
                warn!(
                    "event=customer_save module=repo status=error op={} duration_ms={} error_code={}",
                    op,
                    started_at.elapsed().as_millis(),
                    save_error_code(&err)
                );
                return Err(err);
            }
        };

        tx.commit()?;
        customer.id = Some(id);

        info!(
            "event=customer_save module=repo status=ok op={} customer_id={} duration_ms={}",
            op,
            id,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn normalize_top_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => TOP_CUSTOMERS_DEFAULT_LIMIT,
        Some(value) => value,
    }
}

fn create_in_tx(tx: &Transaction<'_>, customer: &Customer) -> RepoResult<CustomerId> {
    if let Some(phone) = customer.normalized_phone() {
        if phone_owner(tx, phone, None)?.is_some() {
            return Err(RepoError::DuplicatePhone(phone.to_string()));
        }
    }

    tx.execute(
        "INSERT INTO customers (
            first_name,
            last_name,
            phone,
            notes
        ) VALUES (?1, ?2, ?3, ?4);",
        params![
            customer.first_name.as_str(),
            customer.last_name.as_str(),
            customer.phone.as_deref(),
            customer.notes.as_deref(),
        ],
    )?;

    Ok(tx.last_insert_rowid())
}

fn update_in_tx(
    tx: &Transaction<'_>,
    id: CustomerId,
    customer: &Customer,
    options: CustomerRepoOptions,
) -> RepoResult<()> {
    if options.recheck_phone_on_update {
        if let Some(phone) = customer.normalized_phone() {
            if phone_owner(tx, phone, Some(id))?.is_some() {
                return Err(RepoError::DuplicatePhone(phone.to_string()));
            }
        }
    }

    let changed = tx.execute(
        "UPDATE customers
         SET
            first_name = ?1,
            last_name = ?2,
            phone = ?3,
            notes = ?4
         WHERE id = ?5;",
        params![
            customer.first_name.as_str(),
            customer.last_name.as_str(),
            customer.phone.as_deref(),
            customer.notes.as_deref(),
            id,
        ],
    )?;

    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: "customer",
            id,
        });
    }

    Ok(())
}

fn phone_owner(
    tx: &Transaction<'_>,
    phone: &str,
    excluding: Option<CustomerId>,
) -> RepoResult<Option<CustomerId>> {
    let owner = tx
        .query_row(
            "SELECT id
             FROM customers
             WHERE phone = ?1
               AND (?2 IS NULL OR id != ?2)
             LIMIT 1;",
            params![phone, excluding],
            |row| row.get(0),
        )
        .optional()?;
    Ok(owner)
}

fn save_error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::DuplicatePhone(_) => "duplicate_phone",
        RepoError::NotFound { .. } => "not_found",
        _ => "store_failure",
    }
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    let customer = Customer {
        id: Some(row.get("id")?),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        phone: row.get("phone")?,
        notes: row.get("notes")?,
    };

    customer.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "customer {} failed validation: {err}",
            customer.id.unwrap_or_default()
        ))
    })?;
    Ok(customer)
}
