//! CLI probe for the booking core.
//!
//! # Responsibility
//! - Verify `lunchly_core` linkage and configuration loading.
//! - Print the customer directory and busiest customers of a database.
//!
//! Reads `LUNCHLY_*` environment variables; an optional first argument
//! overrides `LUNCHLY_DB_PATH`.

use log::info;
use lunchly_core::db::open_db_with;
use lunchly_core::{
    init_logging_from, CustomerRepository, LunchlyConfig, SqliteCustomerRepository,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lunchly: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut config = LunchlyConfig::from_env()?;
    if let Some(path) = std::env::args().nth(1) {
        config.database.path = Some(PathBuf::from(path));
    }
    init_logging_from(&config.logging)?;

    println!("lunchly_core ping={}", lunchly_core::ping());
    println!("lunchly_core version={}", lunchly_core::core_version());

    let mut conn = open_db_with(&config.database)?;
    let repo = SqliteCustomerRepository::with_options(&mut conn, config.customers)?;

    let customers = repo.list_all()?;
    info!("event=cli_list module=cli status=ok count={}", customers.len());
    println!("customers={}", customers.len());
    for customer in &customers {
        println!(
            "  #{} {}",
            customer.id.unwrap_or_default(),
            customer.full_name()
        );
    }

    let top = repo.find_top_by_reservation_count(None)?;
    println!("top_customers={}", top.len());
    for customer in &top {
        println!(
            "  #{} {}",
            customer.id.unwrap_or_default(),
            customer.full_name()
        );
    }

    Ok(())
}
