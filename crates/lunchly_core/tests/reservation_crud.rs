use lunchly_core::db::open_db_in_memory;
use lunchly_core::repo::error::{FETCH_RESERVATIONS_FAILED, SAVE_RESERVATION_FAILED};
use lunchly_core::{
    Customer, CustomerId, CustomerRepository, RepoError, Reservation, ReservationRepository,
    ReservationValidationError, SqliteCustomerRepository, SqliteReservationRepository,
};
use rusqlite::Connection;

fn reservation_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM reservations;", [], |row| row.get(0))
        .unwrap()
}

fn seed_customer(conn: &mut Connection, first: &str, last: &str) -> CustomerId {
    let mut repo = SqliteCustomerRepository::try_new(conn).unwrap();
    let mut customer = Customer::new(first, last);
    repo.save(&mut customer).unwrap();
    customer.id.unwrap()
}

#[test]
fn save_inserts_then_updates_in_place() {
    let mut conn = open_db_in_memory().unwrap();
    let customer_id = seed_customer(&mut conn, "Ann", "Lee");
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    let mut reservation = Reservation::new(customer_id, 4, "2024-04-05 19:30:00")
        .unwrap()
        .with_notes("birthday");
    repo.save(&mut reservation).unwrap();
    let id = reservation.id.expect("save should assign an id");

    reservation.set_num_guests(6).unwrap();
    reservation.start_at = "2024-04-06 20:00:00".to_string();
    repo.save(&mut reservation).unwrap();
    assert_eq!(reservation.id, Some(id));

    let loaded = repo.get_reservations_for_customer(customer_id).unwrap();
    assert_eq!(loaded, vec![reservation]);
    assert_eq!(loaded[0].num_guests(), 6);
    assert_eq!(reservation_count(&conn), 1);
}

#[test]
fn unparsable_start_at_fails_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    let customer_id = seed_customer(&mut conn, "Ann", "Lee");
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    let mut reservation = Reservation::new(customer_id, 2, "next friday").unwrap();
    let err = repo.save(&mut reservation).unwrap_err();

    assert!(matches!(
        err,
        RepoError::ReservationValidation(ReservationValidationError::InvalidStartAt(_))
    ));
    assert!(reservation.id.is_none());
    assert_eq!(reservation_count(&conn), 0);
}

#[test]
fn rejected_guest_count_leaves_record_saveable() {
    let mut conn = open_db_in_memory().unwrap();
    let customer_id = seed_customer(&mut conn, "Ann", "Lee");
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    let mut reservation = Reservation::new(customer_id, 3, "2024-04-05T19:30:00").unwrap();
    assert!(reservation.set_num_guests(0).is_err());
    assert!(reservation.set_num_guests(-1).is_err());
    assert_eq!(reservation.num_guests(), 3);

    repo.save(&mut reservation).unwrap();
    let loaded = repo.get_reservations_for_customer(customer_id).unwrap();
    assert_eq!(loaded[0].num_guests(), 3);
}

#[test]
fn unknown_customer_is_rejected_by_store_with_stable_message() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    let mut orphan = Reservation::new(999, 2, "2024-04-05 19:30:00").unwrap();
    let err = repo.save(&mut orphan).unwrap_err();

    assert!(matches!(err, RepoError::Fetch(message) if message == SAVE_RESERVATION_FAILED));
    assert_eq!(err.to_string(), SAVE_RESERVATION_FAILED);
    assert!(orphan.id.is_none());
}

#[test]
fn update_of_unknown_id_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let customer_id = seed_customer(&mut conn, "Ann", "Lee");
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    let mut reservation = Reservation::new(customer_id, 2, "2024-04-05 19:30:00").unwrap();
    reservation.id = Some(77);
    let err = repo.save(&mut reservation).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "reservation",
            id: 77
        }
    ));
}

#[test]
fn reservations_are_scoped_to_customer_and_ordered_by_start() {
    let mut conn = open_db_in_memory().unwrap();
    let ann = seed_customer(&mut conn, "Ann", "Lee");
    let bob = seed_customer(&mut conn, "Bob", "Ray");
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    for (customer_id, start_at) in [
        (ann, "2024-05-01 18:00:00"),
        (bob, "2024-04-01 18:00:00"),
        (ann, "2024-04-15 12:00:00"),
    ] {
        repo.save(&mut Reservation::new(customer_id, 2, start_at).unwrap())
            .unwrap();
    }

    let starts: Vec<String> = repo
        .get_reservations_for_customer(ann)
        .unwrap()
        .into_iter()
        .map(|reservation| reservation.start_at)
        .collect();
    assert_eq!(starts, ["2024-04-15 12:00:00", "2024-05-01 18:00:00"]);

    assert!(repo.get_reservations_for_customer(12345).unwrap().is_empty());
}

#[test]
fn mixed_start_at_layouts_are_stored_canonically_and_ordered_chronologically() {
    let mut conn = open_db_in_memory().unwrap();
    let customer_id = seed_customer(&mut conn, "Ann", "Lee");
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    let mut early = Reservation::new(customer_id, 2, "2024-04-05T08:00:00").unwrap();
    repo.save(&mut early).unwrap();
    assert_eq!(early.start_at, "2024-04-05 08:00:00");

    for start_at in ["2024-04-05 09:00:00", " 2024-04-05T07:15 ", "2024-04-04"] {
        repo.save(&mut Reservation::new(customer_id, 2, start_at).unwrap())
            .unwrap();
    }

    let starts: Vec<String> = repo
        .get_reservations_for_customer(customer_id)
        .unwrap()
        .into_iter()
        .map(|reservation| reservation.start_at)
        .collect();
    assert_eq!(
        starts,
        [
            "2024-04-04 00:00:00",
            "2024-04-05 07:15:00",
            "2024-04-05 08:00:00",
            "2024-04-05 09:00:00",
        ]
    );
}

#[test]
fn failed_save_keeps_start_at_as_supplied() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    let mut orphan = Reservation::new(999, 2, "2024-04-05T19:30").unwrap();
    assert!(repo.save(&mut orphan).is_err());
    assert_eq!(orphan.start_at, "2024-04-05T19:30");
}

#[test]
fn corrupt_rows_surface_stable_fetch_message() {
    let mut conn = open_db_in_memory().unwrap();
    let customer_id = seed_customer(&mut conn, "Ann", "Lee");
    conn.execute(
        "INSERT INTO reservations (customer_id, num_guests, start_at) VALUES (?1, 0, 'soon');",
        [customer_id],
    )
    .unwrap();

    let repo = SqliteReservationRepository::try_new(&conn).unwrap();
    let err = repo.get_reservations_for_customer(customer_id).unwrap_err();
    assert!(matches!(err, RepoError::Fetch(message) if message == FETCH_RESERVATIONS_FAILED));
}

#[test]
fn formatted_start_at_reads_back_from_store() {
    let mut conn = open_db_in_memory().unwrap();
    let customer_id = seed_customer(&mut conn, "Ann", "Lee");
    let repo = SqliteReservationRepository::try_new(&conn).unwrap();

    repo.save(&mut Reservation::new(customer_id, 2, "2024-04-05T19:30:00Z").unwrap())
        .unwrap();

    let loaded = repo.get_reservations_for_customer(customer_id).unwrap();
    assert_eq!(
        loaded[0].formatted_start_at().unwrap(),
        "April 5th 2024, 7:30 pm"
    );
}

#[test]
fn reservation_serializes_with_camel_case_keys() {
    let reservation = Reservation::new(3, 2, "2024-04-05 19:30:00").unwrap();
    let value = serde_json::to_value(&reservation).unwrap();

    assert_eq!(value["customerId"], 3);
    assert_eq!(value["numGuests"], 2);
    assert_eq!(value["startAt"], "2024-04-05 19:30:00");
    assert!(value["id"].is_null());
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteReservationRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("reservations")));
}
