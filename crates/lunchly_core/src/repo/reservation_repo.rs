//! Reservation repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Load reservations by owning customer.
//! - Insert or update one reservation with a single statement.
//!
//! # Invariants
//! - `save` validates guest count and start time before any SQL runs.
//! - `start_at` is written in one canonical layout, so `ORDER BY start_at`
//!   is chronological.
//! - `save` is not wrapped in a transaction and performs no uniqueness check.
//! - Store failures never reach callers verbatim; they are logged and
//!   replaced with a stable message.
//! - Customer existence is left to the `customer_id` foreign key.

use crate::model::customer::CustomerId;
use crate::model::reservation::Reservation;
use crate::repo::error::{
    mask_store_error, RepoError, RepoResult, FETCH_RESERVATIONS_FAILED, SAVE_RESERVATION_FAILED,
};
use crate::repo::schema::ensure_table_columns;
use log::{debug, info};
use rusqlite::{params, Connection, Row};

const RESERVATION_COLUMNS: &[&str] = &["id", "customer_id", "num_guests", "start_at", "notes"];

const RESERVATION_SELECT_SQL: &str = "SELECT
    id,
    customer_id,
    num_guests,
    start_at,
    notes
FROM reservations";

/// Repository interface for reservation persistence.
pub trait ReservationRepository {
    /// Returns every reservation held by `customer_id`, earliest first.
    fn get_reservations_for_customer(&self, customer_id: CustomerId)
        -> RepoResult<Vec<Reservation>>;
    /// Inserts a transient reservation (assigning its id) or updates a
    /// persisted one in place.
    fn save(&self, reservation: &mut Reservation) -> RepoResult<()>;
}

/// SQLite-backed reservation repository.
pub struct SqliteReservationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReservationRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_columns(conn, "reservations", RESERVATION_COLUMNS)?;
        Ok(Self { conn })
    }

    fn query_for_customer(&self, customer_id: CustomerId) -> RepoResult<Vec<Reservation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESERVATION_SELECT_SQL}
             WHERE customer_id = ?1
             ORDER BY start_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([customer_id])?;
        let mut reservations = Vec::new();
        while let Some(row) = rows.next()? {
            reservations.push(parse_reservation_row(row)?);
        }
        Ok(reservations)
    }

    fn insert(&self, reservation: &Reservation, start_at: &str) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO reservations (
                customer_id,
                num_guests,
                start_at,
                notes
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                reservation.customer_id,
                reservation.num_guests(),
                start_at,
                reservation.notes.as_deref(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: i64, reservation: &Reservation, start_at: &str) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE reservations
             SET
                customer_id = ?1,
                num_guests = ?2,
                start_at = ?3,
                notes = ?4
             WHERE id = ?5;",
            params![
                reservation.customer_id,
                reservation.num_guests(),
                start_at,
                reservation.notes.as_deref(),
                id,
            ],
        )?;
        Ok(changed)
    }
}

impl ReservationRepository for SqliteReservationRepository<'_> {
    fn get_reservations_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Vec<Reservation>> {
        let reservations = self.query_for_customer(customer_id).map_err(|err| {
            mask_store_error("reservation_list", err, FETCH_RESERVATIONS_FAILED)
        })?;
        debug!(
            "event=reservation_list module=repo status=ok customer_id={} count={}",
            customer_id,
            reservations.len()
        );
        Ok(reservations)
    }

    fn save(&self, reservation: &mut Reservation) -> RepoResult<()> {
        reservation.validate()?;
        let start_at = reservation.canonical_start_at()?;

        match reservation.id {
            None => {
                let id = self.insert(reservation, &start_at).map_err(|err| {
                    mask_store_error("reservation_save", err, SAVE_RESERVATION_FAILED)
                })?;
                reservation.id = Some(id);
                info!(
                    "event=reservation_save module=repo status=ok op=insert reservation_id={} customer_id={}",
                    id, reservation.customer_id
                );
            }
            Some(id) => {
                let changed = self.update(id, reservation, &start_at).map_err(|err| {
                    mask_store_error("reservation_save", err, SAVE_RESERVATION_FAILED)
                })?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "reservation",
                        id,
                    });
                }
                info!(
                    "event=reservation_save module=repo status=ok op=update reservation_id={} customer_id={}",
                    id, reservation.customer_id
                );
            }
        }

        reservation.start_at = start_at;
        Ok(())
    }
}

fn parse_reservation_row(row: &Row<'_>) -> RepoResult<Reservation> {
    let id: i64 = row.get("id")?;
    let num_guests: i64 = row.get("num_guests")?;
    let reservation = Reservation::from_row_parts(
        id,
        row.get("customer_id")?,
        num_guests,
        row.get("start_at")?,
        row.get("notes")?,
    );

    reservation.validate().map_err(|err| {
        RepoError::InvalidData(format!("reservation {id} failed validation: {err}"))
    })?;
    Ok(reservation)
}
