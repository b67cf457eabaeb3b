// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.


use crate::models::{NewPeriod, NewRecord};
use nomina_domain::{Amount, CompanyId, PeriodState, Periodicity, RecordState, display_name};
use time::Date;

pub fn test_company() -> CompanyId {
    CompanyId::new("acme-sa")
}

/// A period input with canonical name and number derived from the range.
pub fn period_input(
    company: &CompanyId,
    periodicity: Periodicity,
    start: Date,
    end: Date,
    state: PeriodState,
) -> NewPeriod {
    NewPeriod {
        company_id: company.clone(),
        periodicity,
        start_date: start,
        end_date: end,
        sequence_number: Some(nomina_domain::sequence_number(start, periodicity)),
        display_name: display_name(start, end),
        state,
        employee_count: 0,
        gross_total: Amount::ZERO,
        deductions_total: Amount::ZERO,
        net_total: Amount::ZERO,
    }
}

pub fn record_input(period_id: i64, employee: &str, state: RecordState) -> NewRecord {
    NewRecord {
        period_id,
        employee_id: employee.to_string(),
        state,
        gross_pay: Amount::from_cents(100_000),
        deductions: Amount::from_cents(20_000),
        net_pay: Amount::from_cents(80_000),
    }
}
