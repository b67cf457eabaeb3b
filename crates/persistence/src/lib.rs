// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the nomina payroll ledger.
//!
//! This crate provides a Diesel/SQLite adapter over the period table, the
//! child payroll-record table, and the company-settings table. In-memory
//! databases back unit and integration tests; file-backed databases run
//! in WAL mode.
//!
//! Foreign-key enforcement is verified at startup: deleting a period must
//! cascade to its payroll records, and the store refuses to operate
//! without that guarantee.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use nomina_domain::{Amount, CompanyId, PayrollRecord, Period, PeriodState, Periodicity};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::Date;

mod backend;
mod error;
mod models;
mod mutations;
mod queries;
mod schema;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use models::{NewPeriod, NewRecord};

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions. Each call to `new_in_memory()` receives a unique
/// sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the payroll ledger.
pub struct PayrollStore {
    conn: SqliteConnection,
}

impl PayrollStore {
    /// Creates a store backed by an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based
    /// collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name: String = format!("nomina_memdb_{db_id}");
        let shared_memory_url: String = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a store backed by a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Company settings
    // ========================================================================

    /// Looks up the configured default periodicity for a company.
    ///
    /// # Errors
    ///
    /// Returns `CompanySettingsNotFound` if no settings row exists.
    pub fn default_periodicity(
        &mut self,
        company_id: &CompanyId,
    ) -> Result<Periodicity, PersistenceError> {
        queries::default_periodicity(&mut self.conn, company_id)
    }

    /// Inserts or replaces the settings row for a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub fn put_company_settings(
        &mut self,
        company_id: &CompanyId,
        periodicity: Periodicity,
    ) -> Result<(), PersistenceError> {
        mutations::put_company_settings(&mut self.conn, company_id, periodicity)
    }

    // ========================================================================
    // Periods
    // ========================================================================

    /// Loads all periods for a company and periodicity, ordered by start
    /// date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be
    /// reconstructed.
    pub fn list_periods(
        &mut self,
        company_id: &CompanyId,
        periodicity: Periodicity,
    ) -> Result<Vec<Period>, PersistenceError> {
        queries::list_periods(&mut self.conn, company_id, periodicity)
    }

    /// Loads a single period by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be
    /// reconstructed.
    pub fn get_period(&mut self, period_id: i64) -> Result<Option<Period>, PersistenceError> {
        queries::get_period(&mut self.conn, period_id)
    }

    /// Finds a period with the exact (start, end) range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be
    /// reconstructed.
    pub fn find_period_by_range(
        &mut self,
        company_id: &CompanyId,
        periodicity: Periodicity,
        start_date: Date,
        end_date: Date,
    ) -> Result<Option<Period>, PersistenceError> {
        queries::find_period_by_range(&mut self.conn, company_id, periodicity, start_date, end_date)
    }

    /// Inserts a new period and returns the stored row as a domain value.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_period(&mut self, period: &NewPeriod) -> Result<Period, PersistenceError> {
        let id: i64 = mutations::insert_period(&mut self.conn, period)?;
        queries::get_period(&mut self.conn, id)?
            .ok_or(PersistenceError::PeriodNotFound(id))
    }

    /// Overwrites a period's stored sequence number.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if no row matched, or a query error.
    pub fn update_sequence_number(
        &mut self,
        period_id: i64,
        sequence_number: i32,
    ) -> Result<(), PersistenceError> {
        mutations::update_sequence_number(&mut self.conn, period_id, sequence_number)
    }

    /// Overwrites a period's stored display name.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if no row matched, or a query error.
    pub fn update_display_name(
        &mut self,
        period_id: i64,
        display_name: &str,
    ) -> Result<(), PersistenceError> {
        mutations::update_display_name(&mut self.conn, period_id, display_name)
    }

    /// Overwrites a period's state and aggregate totals in one write.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if no row matched, or a query error.
    pub fn update_state_and_totals(
        &mut self,
        period_id: i64,
        state: PeriodState,
        employee_count: i32,
        gross_total: Amount,
        deductions_total: Amount,
        net_total: Amount,
    ) -> Result<(), PersistenceError> {
        mutations::update_state_and_totals(
            &mut self.conn,
            period_id,
            state,
            employee_count,
            gross_total,
            deductions_total,
            net_total,
        )
    }

    /// Deletes a period; child payroll records cascade.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if no row matched, or a query error.
    pub fn delete_period(&mut self, period_id: i64) -> Result<(), PersistenceError> {
        mutations::delete_period(&mut self.conn, period_id)
    }

    // ========================================================================
    // Payroll records
    // ========================================================================

    /// Loads all payroll records belonging to a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be
    /// reconstructed.
    pub fn list_records(
        &mut self,
        period_id: i64,
    ) -> Result<Vec<PayrollRecord>, PersistenceError> {
        queries::list_records(&mut self.conn, period_id)
    }

    /// Inserts a payroll record and returns its assigned row id.
    ///
    /// The liquidation workflow owns these rows in production; this entry
    /// point exists for seeding and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_record(&mut self, record: &NewRecord) -> Result<i64, PersistenceError> {
        mutations::insert_record(&mut self.conn, record)
    }
}
