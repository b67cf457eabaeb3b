// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only ledger diagnostics.
//!
//! [`run_diagnostic`] inspects one company's periods without writing
//! anything and never fails: datastore errors become entries in the
//! report's `issues` list and the call still returns whatever it could
//! establish. The grouping helpers here are shared with both corrective
//! passes so detection and repair agree on what a duplicate or a
//! conflict is.

use crate::report::{DiagnosticReport, DuplicateGroup, NumberingConflict};
use nomina_domain::{
    CompanyId, PayrollRecord, Period, PeriodState, Periodicity, display_name, is_standard_start,
    sequence_number,
};
use nomina_persistence::PayrollStore;
use std::collections::BTreeMap;
use time::{Date, macros::date};

/// Known (start date, periodicity, expected number) cases used to catch
/// a regression in the sequence calculator itself.
const SELF_TEST_CASES: [(Date, Periodicity, i32); 6] = [
    (date!(2025 - 01 - 01), Periodicity::Biweekly, 1),
    (date!(2025 - 01 - 16), Periodicity::Biweekly, 2),
    (date!(2025 - 07 - 01), Periodicity::Biweekly, 13),
    (date!(2025 - 12 - 16), Periodicity::Biweekly, 24),
    (date!(2025 - 06 - 01), Periodicity::Monthly, 6),
    (date!(2025 - 01 - 06), Periodicity::Weekly, 2),
];

/// Runs the self-test suite, returning one line per failing case.
fn calculator_self_test() -> Vec<String> {
    let mut failures: Vec<String> = Vec::new();
    for (start, periodicity, expected) in SELF_TEST_CASES {
        let actual: i32 = sequence_number(start, periodicity);
        if actual != expected {
            failures.push(format!(
                "Calculator self-test failed: {start} / {periodicity} produced {actual}, expected {expected}"
            ));
        }
    }
    failures
}

/// Groups periods sharing an identical (start, end) range.
pub(crate) fn duplicate_groups(periods: &[Period]) -> Vec<DuplicateGroup> {
    let mut by_range: BTreeMap<(Date, Date), Vec<i64>> = BTreeMap::new();
    for period in periods {
        by_range
            .entry((period.start_date, period.end_date))
            .or_default()
            .push(period.id);
    }
    by_range
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((start_date, end_date), period_ids)| DuplicateGroup {
            start_date,
            end_date,
            period_ids,
        })
        .collect()
}

/// Groups periods of the same cycle year sharing a stored sequence
/// number. Numbers restart every year, so grouping is keyed on
/// (start year, number).
pub(crate) fn conflict_groups(periods: &[Period]) -> Vec<NumberingConflict> {
    let mut by_slot: BTreeMap<(i32, i32), Vec<i64>> = BTreeMap::new();
    for period in periods {
        if let Some(number) = period.sequence_number {
            by_slot
                .entry((period.start_date.year(), number))
                .or_default()
                .push(period.id);
        }
    }
    by_slot
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((cycle_year, number), period_ids)| NumberingConflict {
            cycle_year,
            sequence_number: number,
            period_ids,
        })
        .collect()
}

/// Whether a draft period's children say it should no longer be draft.
pub(crate) fn children_outran_period(period: &Period, records: &[PayrollRecord]) -> bool {
    period.state == PeriodState::Draft
        && !records.is_empty()
        && records.iter().all(|r| r.state.is_beyond_draft())
}

/// Inspects one company's ledger and reports everything found wrong.
///
/// Read-only; never writes and never fails. Datastore errors are
/// captured into the report's `issues` and the partial report is
/// returned as-is.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn run_diagnostic(store: &mut PayrollStore, company_id: &CompanyId) -> DiagnosticReport {
    let mut report: DiagnosticReport = DiagnosticReport::new(company_id.clone());

    let self_test_failures: Vec<String> = calculator_self_test();
    if !self_test_failures.is_empty() {
        report.calculator_ok = false;
        report.issues.extend(self_test_failures);
        report
            .recommendations
            .push("Sequence calculator is misbehaving; do not run corrective passes".to_string());
    }

    let periodicity: Periodicity = match store.default_periodicity(company_id) {
        Ok(periodicity) => periodicity,
        Err(e) => {
            report
                .issues
                .push(format!("Company settings unavailable: {e}"));
            return report;
        }
    };

    let periods: Vec<Period> = match store.list_periods(company_id, periodicity) {
        Ok(periods) => periods,
        Err(e) => {
            report.issues.push(format!("Could not load periods: {e}"));
            return report;
        }
    };

    for period in &periods {
        *report
            .state_distribution
            .entry(period.state.as_str().to_string())
            .or_insert(0) += 1;

        let canonical_number: i32 = sequence_number(period.start_date, periodicity);
        match period.sequence_number {
            Some(stored) if stored != canonical_number => {
                report.issues.push(format!(
                    "Period {} ({} to {}) stores number {stored}, canonical is {canonical_number}",
                    period.id, period.start_date, period.end_date
                ));
            }
            None => {
                report.issues.push(format!(
                    "Period {} ({} to {}) has no sequence number",
                    period.id, period.start_date, period.end_date
                ));
            }
            Some(_) => {}
        }

        let cycle_length: i32 = periodicity.cycle_length();
        if canonical_number < 1 || canonical_number > cycle_length {
            report.issues.push(format!(
                "Period {} maps to number {canonical_number}, outside 1..{cycle_length}",
                period.id
            ));
        }

        if !is_standard_start(period.start_date, periodicity) {
            report.issues.push(format!(
                "Period {} starts on {} which is not a standard {periodicity} boundary",
                period.id, period.start_date
            ));
        }

        let canonical_name: String = display_name(period.start_date, period.end_date);
        if period.display_name != canonical_name {
            report.issues.push(format!(
                "Period {} is named {:?}, canonical is {canonical_name:?}",
                period.id, period.display_name
            ));
        }
    }

    report.duplicates = duplicate_groups(&periods);
    for group in &report.duplicates {
        report.issues.push(format!(
            "{} periods share the range {} to {}",
            group.period_ids.len(),
            group.start_date,
            group.end_date
        ));
    }

    report.conflicts = conflict_groups(&periods);
    for conflict in &report.conflicts {
        report.issues.push(format!(
            "{} periods share sequence number {} in the {} cycle",
            conflict.period_ids.len(),
            conflict.sequence_number,
            conflict.cycle_year
        ));
    }

    for period in periods.iter().filter(|p| p.state == PeriodState::Draft) {
        match store.list_records(period.id) {
            Ok(records) => {
                if children_outran_period(period, &records) {
                    report.issues.push(format!(
                        "Period {} is draft but all {} payroll records have advanced",
                        period.id,
                        records.len()
                    ));
                    let heal_hint: &str = "Run the state-consistency heal";
                    if !report.recommendations.iter().any(|r| r == heal_hint) {
                        report.recommendations.push(heal_hint.to_string());
                    }
                }
            }
            Err(e) => {
                report.issues.push(format!(
                    "Could not load records for period {}: {e}",
                    period.id
                ));
            }
        }
    }

    if !report.duplicates.is_empty() {
        report
            .recommendations
            .push("Run the standard corrective pass to collapse duplicates".to_string());
    }
    if !report.conflicts.is_empty() {
        report
            .recommendations
            .push("Run the root corrective pass to resolve numbering conflicts".to_string());
    }

    tracing::debug!(
        company = %report.company_id,
        issues = report.issues.len(),
        duplicates = report.duplicates.len(),
        conflicts = report.conflicts.len(),
        "Diagnostic complete"
    );

    report
}
