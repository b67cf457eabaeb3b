// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod post_closure_tests;
mod root_tests;

use nomina_domain::{
    Amount, CompanyId, Period, PeriodState, Periodicity, RecordState, display_name,
    sequence_number,
};
use nomina_persistence::{NewPeriod, NewRecord, PayrollStore};
use time::Date;

pub fn test_company() -> CompanyId {
    CompanyId::new("acme-sa")
}

/// A fresh in-memory store with company settings already written.
pub fn seeded_store(periodicity: Periodicity) -> (PayrollStore, CompanyId) {
    let mut store: PayrollStore = PayrollStore::new_in_memory().unwrap();
    let company: CompanyId = test_company();
    store.put_company_settings(&company, periodicity).unwrap();
    (store, company)
}

/// A period input with every stored field chosen by the test, for
/// seeding corrupted ledgers.
pub fn raw_period(
    company: &CompanyId,
    periodicity: Periodicity,
    start: Date,
    end: Date,
    number: Option<i32>,
    name: &str,
    state: PeriodState,
) -> NewPeriod {
    NewPeriod {
        company_id: company.clone(),
        periodicity,
        start_date: start,
        end_date: end,
        sequence_number: number,
        display_name: name.to_string(),
        state,
        employee_count: 0,
        gross_total: Amount::ZERO,
        deductions_total: Amount::ZERO,
        net_total: Amount::ZERO,
    }
}

/// A period input whose number and name are the canonical values.
pub fn canonical_period(
    company: &CompanyId,
    periodicity: Periodicity,
    start: Date,
    end: Date,
    state: PeriodState,
) -> NewPeriod {
    raw_period(
        company,
        periodicity,
        start,
        end,
        Some(sequence_number(start, periodicity)),
        &display_name(start, end),
        state,
    )
}

/// A payroll record with the amounts used throughout these tests:
/// 1000.00 gross, 200.00 deductions, 800.00 net.
pub fn record(period_id: i64, employee: &str, state: RecordState) -> NewRecord {
    NewRecord {
        period_id,
        employee_id: employee.to_string(),
        state,
        gross_pay: Amount::from_cents(100_000),
        deductions: Amount::from_cents(20_000),
        net_pay: Amount::from_cents(80_000),
    }
}

/// Loads the full ledger for assertions.
pub fn ledger(
    store: &mut PayrollStore,
    company: &CompanyId,
    periodicity: Periodicity,
) -> Vec<Period> {
    store.list_periods(company, periodicity).unwrap()
}
