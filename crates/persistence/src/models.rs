// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row models and conversions between stored rows and domain values.
//!
//! Dates and timestamps are stored as ISO-8601 text; states and
//! periodicities are stored as their domain tokens. Reconstruction
//! failures surface as [`PersistenceError`] values, never panics.

use crate::error::PersistenceError;
use crate::schema::{payroll_periods, payroll_records};
use diesel::prelude::*;
use nomina_domain::{
    Amount, CompanyId, DomainError, PayrollRecord, Period, PeriodState, Periodicity, RecordState,
};
use time::Date;
use time::format_description::FormatItem;
use time::format_description::well_known::Iso8601;

/// Stored form of the date columns. A `Date` carries no time or offset
/// components, so the well-known ISO-8601 formatter cannot render it.
const DATE_COLUMN: &[FormatItem<'_>] =
    time::macros::format_description!("[year]-[month]-[day]");

/// Parses an ISO-8601 date column.
///
/// # Errors
///
/// Returns a `DateParse` error for malformed text.
pub(crate) fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, DATE_COLUMN).map_err(|e| DomainError::DateParse {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Formats a date for an ISO-8601 date column.
pub(crate) fn format_date(date: Date) -> Result<String, PersistenceError> {
    date.format(DATE_COLUMN)
        .map_err(|e| PersistenceError::ReconstructionError(format!("Failed to format {date}: {e}")))
}

/// Current UTC timestamp for `created_at` / `updated_at` columns.
pub(crate) fn now_timestamp() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Iso8601::DEFAULT)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// A `payroll_periods` row as stored.
#[derive(Debug, Clone, Queryable)]
pub struct PeriodRow {
    pub id: i64,
    pub company_id: String,
    pub tipo_periodo: String,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub numero_periodo_anual: Option<i32>,
    pub periodo: String,
    pub estado: String,
    pub empleados_count: i32,
    pub total_devengado: i64,
    pub total_deducciones: i64,
    pub total_neto: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl PeriodRow {
    /// Reconstructs the domain period from this row.
    ///
    /// # Errors
    ///
    /// Returns an error if a date or state column cannot be parsed.
    pub fn into_domain(self) -> Result<Period, PersistenceError> {
        Ok(Period {
            id: self.id,
            company_id: CompanyId::new(&self.company_id),
            periodicity: Periodicity::parse(&self.tipo_periodo)?,
            start_date: parse_date(&self.fecha_inicio)?,
            end_date: parse_date(&self.fecha_fin)?,
            sequence_number: self.numero_periodo_anual,
            display_name: self.periodo,
            state: PeriodState::parse(&self.estado)?,
            employee_count: self.empleados_count,
            gross_total: Amount::from_cents(self.total_devengado),
            deductions_total: Amount::from_cents(self.total_deducciones),
            net_total: Amount::from_cents(self.total_neto),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable `payroll_periods` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payroll_periods)]
pub struct NewPeriodRow {
    pub company_id: String,
    pub tipo_periodo: String,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub numero_periodo_anual: Option<i32>,
    pub periodo: String,
    pub estado: String,
    pub empleados_count: i32,
    pub total_devengado: i64,
    pub total_deducciones: i64,
    pub total_neto: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A `payroll_records` row as stored.
#[derive(Debug, Clone, Queryable)]
pub struct RecordRow {
    pub id: i64,
    pub period_id: i64,
    pub employee_id: String,
    pub estado: String,
    pub total_devengado: i64,
    pub total_deducciones: i64,
    pub neto_pagado: i64,
}

impl RecordRow {
    /// Reconstructs the domain payroll record from this row.
    ///
    /// # Errors
    ///
    /// Returns an error if the state column cannot be parsed.
    pub fn into_domain(self) -> Result<PayrollRecord, PersistenceError> {
        Ok(PayrollRecord {
            id: self.id,
            period_id: self.period_id,
            employee_id: self.employee_id,
            state: RecordState::parse(&self.estado)?,
            gross_pay: Amount::from_cents(self.total_devengado),
            deductions: Amount::from_cents(self.total_deducciones),
            net_pay: Amount::from_cents(self.neto_pagado),
        })
    }
}

/// Insertable `payroll_records` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payroll_records)]
pub struct NewRecordRow {
    pub period_id: i64,
    pub employee_id: String,
    pub estado: String,
    pub total_devengado: i64,
    pub total_deducciones: i64,
    pub neto_pagado: i64,
}

/// Input for creating a period, expressed in domain terms.
///
/// The store assigns the row id and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPeriod {
    pub company_id: CompanyId,
    pub periodicity: Periodicity,
    pub start_date: Date,
    pub end_date: Date,
    pub sequence_number: Option<i32>,
    pub display_name: String,
    pub state: PeriodState,
    pub employee_count: i32,
    pub gross_total: Amount,
    pub deductions_total: Amount,
    pub net_total: Amount,
}

impl NewPeriod {
    /// A draft period with zero aggregates, the shape both resolvers and
    /// the detection service create.
    #[must_use]
    pub fn zeroed_draft(
        company_id: CompanyId,
        periodicity: Periodicity,
        start_date: Date,
        end_date: Date,
        sequence_number: i32,
        display_name: String,
    ) -> Self {
        Self {
            company_id,
            periodicity,
            start_date,
            end_date,
            sequence_number: Some(sequence_number),
            display_name,
            state: PeriodState::Draft,
            employee_count: 0,
            gross_total: Amount::ZERO,
            deductions_total: Amount::ZERO,
            net_total: Amount::ZERO,
        }
    }
}

/// Input for creating a payroll record (used by tests and seeding; the
/// liquidation workflow owns these rows in production).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub period_id: i64,
    pub employee_id: String,
    pub state: RecordState,
    pub gross_pay: Amount,
    pub deductions: Amount,
    pub net_pay: Amount,
}
