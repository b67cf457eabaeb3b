// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side operations against the payroll ledger.

use crate::error::PersistenceError;
use crate::models::{self, PeriodRow, RecordRow};
use crate::schema::{company_settings, payroll_periods, payroll_records};
use diesel::prelude::*;
use diesel::SqliteConnection;
use nomina_domain::{CompanyId, PayrollRecord, Period, Periodicity};
use time::Date;

/// Looks up the configured default periodicity for a company.
///
/// # Errors
///
/// Returns `CompanySettingsNotFound` if no settings row exists.
pub fn default_periodicity(
    conn: &mut SqliteConnection,
    company_id: &CompanyId,
) -> Result<Periodicity, PersistenceError> {
    let result: Result<String, diesel::result::Error> = company_settings::table
        .select(company_settings::tipo_periodo)
        .filter(company_settings::company_id.eq(company_id.value()))
        .first::<String>(conn);

    match result {
        Ok(token) => Ok(Periodicity::parse(&token)?),
        Err(diesel::result::Error::NotFound) => Err(PersistenceError::CompanySettingsNotFound(
            company_id.value().to_string(),
        )),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Loads all periods for a company and periodicity, ordered by start date.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_periods(
    conn: &mut SqliteConnection,
    company_id: &CompanyId,
    periodicity: Periodicity,
) -> Result<Vec<Period>, PersistenceError> {
    let rows: Vec<PeriodRow> = payroll_periods::table
        .filter(payroll_periods::company_id.eq(company_id.value()))
        .filter(payroll_periods::tipo_periodo.eq(periodicity.as_str()))
        .order(payroll_periods::fecha_inicio.asc())
        .load::<PeriodRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_periods: {e}")))?;

    rows.into_iter().map(PeriodRow::into_domain).collect()
}

/// Loads a single period by row id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_period(
    conn: &mut SqliteConnection,
    period_id: i64,
) -> Result<Option<Period>, PersistenceError> {
    let row: Option<PeriodRow> = payroll_periods::table
        .filter(payroll_periods::id.eq(period_id))
        .first::<PeriodRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_period: {e}")))?;

    row.map(PeriodRow::into_domain).transpose()
}

/// Finds a period with the exact (start, end) range for a company and
/// periodicity, used for collision checks on suggested ranges.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_period_by_range(
    conn: &mut SqliteConnection,
    company_id: &CompanyId,
    periodicity: Periodicity,
    start_date: Date,
    end_date: Date,
) -> Result<Option<Period>, PersistenceError> {
    let start: String = models::format_date(start_date)?;
    let end: String = models::format_date(end_date)?;

    let row: Option<PeriodRow> = payroll_periods::table
        .filter(payroll_periods::company_id.eq(company_id.value()))
        .filter(payroll_periods::tipo_periodo.eq(periodicity.as_str()))
        .filter(payroll_periods::fecha_inicio.eq(start))
        .filter(payroll_periods::fecha_fin.eq(end))
        .first::<PeriodRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_period_by_range: {e}")))?;

    row.map(PeriodRow::into_domain).transpose()
}

/// Loads all payroll records belonging to a period.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_records(
    conn: &mut SqliteConnection,
    period_id: i64,
) -> Result<Vec<PayrollRecord>, PersistenceError> {
    let rows: Vec<RecordRow> = payroll_records::table
        .filter(payroll_records::period_id.eq(period_id))
        .order(payroll_records::id.asc())
        .load::<RecordRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_records: {e}")))?;

    rows.into_iter().map(RecordRow::into_domain).collect()
}
