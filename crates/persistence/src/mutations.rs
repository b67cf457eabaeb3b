// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side operations against the payroll ledger.
//!
//! Every period update touches `updated_at`; the reconciliation engine
//! relies on that column for recency tie-breaks.

use crate::backend;
use crate::error::PersistenceError;
use crate::models::{self, NewPeriod, NewPeriodRow, NewRecord, NewRecordRow};
use crate::schema::{company_settings, payroll_periods, payroll_records};
use diesel::prelude::*;
use diesel::SqliteConnection;
use nomina_domain::{Amount, CompanyId, PeriodState, Periodicity};

/// Inserts or replaces the settings row for a company.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub fn put_company_settings(
    conn: &mut SqliteConnection,
    company_id: &CompanyId,
    periodicity: Periodicity,
) -> Result<(), PersistenceError> {
    diesel::replace_into(company_settings::table)
        .values((
            company_settings::company_id.eq(company_id.value()),
            company_settings::tipo_periodo.eq(periodicity.as_str()),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("put_company_settings: {e}")))?;
    Ok(())
}

/// Inserts a new period and returns its assigned row id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_period(
    conn: &mut SqliteConnection,
    period: &NewPeriod,
) -> Result<i64, PersistenceError> {
    let now: String = models::now_timestamp();
    let row: NewPeriodRow = NewPeriodRow {
        company_id: period.company_id.value().to_string(),
        tipo_periodo: period.periodicity.as_str().to_string(),
        fecha_inicio: models::format_date(period.start_date)?,
        fecha_fin: models::format_date(period.end_date)?,
        numero_periodo_anual: period.sequence_number,
        periodo: period.display_name.clone(),
        estado: period.state.as_str().to_string(),
        empleados_count: period.employee_count,
        total_devengado: period.gross_total.cents(),
        total_deducciones: period.deductions_total.cents(),
        total_neto: period.net_total.cents(),
        created_at: now.clone(),
        updated_at: now,
    };

    diesel::insert_into(payroll_periods::table)
        .values(&row)
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("insert_period: {e}")))?;

    backend::get_last_insert_rowid(conn)
}

/// Inserts a payroll record and returns its assigned row id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_record(
    conn: &mut SqliteConnection,
    record: &NewRecord,
) -> Result<i64, PersistenceError> {
    let row: NewRecordRow = NewRecordRow {
        period_id: record.period_id,
        employee_id: record.employee_id.clone(),
        estado: record.state.as_str().to_string(),
        total_devengado: record.gross_pay.cents(),
        total_deducciones: record.deductions.cents(),
        neto_pagado: record.net_pay.cents(),
    };

    diesel::insert_into(payroll_records::table)
        .values(&row)
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("insert_record: {e}")))?;

    backend::get_last_insert_rowid(conn)
}

/// Overwrites a period's stored sequence number.
///
/// # Errors
///
/// Returns `PeriodNotFound` if no row matched, or a query error.
pub fn update_sequence_number(
    conn: &mut SqliteConnection,
    period_id: i64,
    sequence_number: i32,
) -> Result<(), PersistenceError> {
    let rows_affected: usize =
        diesel::update(payroll_periods::table.filter(payroll_periods::id.eq(period_id)))
            .set((
                payroll_periods::numero_periodo_anual.eq(Some(sequence_number)),
                payroll_periods::updated_at.eq(models::now_timestamp()),
            ))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("update_sequence_number: {e}")))?;

    if rows_affected == 0 {
        return Err(PersistenceError::PeriodNotFound(period_id));
    }
    Ok(())
}

/// Overwrites a period's stored display name.
///
/// # Errors
///
/// Returns `PeriodNotFound` if no row matched, or a query error.
pub fn update_display_name(
    conn: &mut SqliteConnection,
    period_id: i64,
    display_name: &str,
) -> Result<(), PersistenceError> {
    let rows_affected: usize =
        diesel::update(payroll_periods::table.filter(payroll_periods::id.eq(period_id)))
            .set((
                payroll_periods::periodo.eq(display_name),
                payroll_periods::updated_at.eq(models::now_timestamp()),
            ))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("update_display_name: {e}")))?;

    if rows_affected == 0 {
        return Err(PersistenceError::PeriodNotFound(period_id));
    }
    Ok(())
}

/// Overwrites a period's state and aggregate totals in one write, used by
/// the silent auto-heal when closing a draft whose children all advanced.
///
/// # Errors
///
/// Returns `PeriodNotFound` if no row matched, or a query error.
pub fn update_state_and_totals(
    conn: &mut SqliteConnection,
    period_id: i64,
    state: PeriodState,
    employee_count: i32,
    gross_total: Amount,
    deductions_total: Amount,
    net_total: Amount,
) -> Result<(), PersistenceError> {
    let rows_affected: usize =
        diesel::update(payroll_periods::table.filter(payroll_periods::id.eq(period_id)))
            .set((
                payroll_periods::estado.eq(state.as_str()),
                payroll_periods::empleados_count.eq(employee_count),
                payroll_periods::total_devengado.eq(gross_total.cents()),
                payroll_periods::total_deducciones.eq(deductions_total.cents()),
                payroll_periods::total_neto.eq(net_total.cents()),
                payroll_periods::updated_at.eq(models::now_timestamp()),
            ))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("update_state_and_totals: {e}")))?;

    if rows_affected == 0 {
        return Err(PersistenceError::PeriodNotFound(period_id));
    }
    Ok(())
}

/// Deletes a period; child payroll records cascade at the schema level.
///
/// # Errors
///
/// Returns `PeriodNotFound` if no row matched, or a query error.
pub fn delete_period(conn: &mut SqliteConnection, period_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize =
        diesel::delete(payroll_periods::table.filter(payroll_periods::id.eq(period_id)))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("delete_period: {e}")))?;

    if rows_affected == 0 {
        return Err(PersistenceError::PeriodNotFound(period_id));
    }
    Ok(())
}
