// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Current-period detection.
//!
//! The entry point callers hit before any payroll work: decide whether
//! to resume an active period, create the next one, or stop and
//! diagnose. Reading and healing are separate operations composed here;
//! [`detect_current_period_status`] runs the heal explicitly before
//! partitioning, and callers who want the pure read path use
//! [`crate::run_diagnostic`] alone.

use crate::diagnostic::{children_outran_period, run_diagnostic};
use crate::error::ReconError;
use crate::report::{DetectionAction, DetectionStatus, DiagnosticReport, HealOutcome, SuggestedRange};
use nomina_domain::{
    Amount, AnnualCycle, CompanyId, PayrollRecord, Period, PeriodInterval, PeriodState,
    Periodicity, sequence_number,
};
use nomina_persistence::{NewPeriod, PayrollStore};
use time::Date;

fn aggregate_records(records: &[PayrollRecord]) -> Result<(Amount, Amount, Amount), ReconError> {
    let mut gross: Amount = Amount::ZERO;
    let mut deductions: Amount = Amount::ZERO;
    let mut net: Amount = Amount::ZERO;
    for record in records {
        gross = gross.checked_add(record.gross_pay)?;
        deductions = deductions.checked_add(record.deductions)?;
        net = net.checked_add(record.net_pay)?;
    }
    Ok((gross, deductions, net))
}

/// Promotes draft periods whose payroll records have all advanced.
///
/// For each draft period with at least one record and no record still in
/// draft, recomputes the aggregates from the children and closes the
/// period. A period with zero records is untouched. Unit failures leave
/// their period in its prior state and are reported in the outcome.
pub fn auto_heal(store: &mut PayrollStore, company_id: &CompanyId) -> HealOutcome {
    let mut outcome: HealOutcome = HealOutcome::default();

    let periodicity: Periodicity = match store.default_periodicity(company_id) {
        Ok(periodicity) => periodicity,
        Err(e) => {
            outcome
                .errors
                .push(format!("Company settings unavailable: {e}"));
            return outcome;
        }
    };
    let periods: Vec<Period> = match store.list_periods(company_id, periodicity) {
        Ok(periods) => periods,
        Err(e) => {
            outcome.errors.push(format!("Could not load periods: {e}"));
            return outcome;
        }
    };

    for period in periods.iter().filter(|p| p.state == PeriodState::Draft) {
        let records: Vec<PayrollRecord> = match store.list_records(period.id) {
            Ok(records) => records,
            Err(e) => {
                outcome.errors.push(format!(
                    "Could not load records for period {}: {e}",
                    period.id
                ));
                continue;
            }
        };
        if !children_outran_period(period, &records) {
            continue;
        }

        let (gross, deductions, net) = match aggregate_records(&records) {
            Ok(totals) => totals,
            Err(e) => {
                outcome.errors.push(format!(
                    "Could not aggregate records for period {}: {e}",
                    period.id
                ));
                continue;
            }
        };
        let employee_count: i32 = i32::try_from(records.len()).unwrap_or(i32::MAX);

        match store.update_state_and_totals(
            period.id,
            PeriodState::Closed,
            employee_count,
            gross,
            deductions,
            net,
        ) {
            Ok(()) => {
                outcome.healed_period_ids.push(period.id);
                tracing::info!(
                    period = period.id,
                    employee_count,
                    gross = gross.cents(),
                    net = net.cents(),
                    "Healed draft period whose records had all advanced"
                );
            }
            Err(e) => {
                outcome
                    .errors
                    .push(format!("Could not heal period {}: {e}", period.id));
            }
        }
    }

    outcome
}

fn range_from_interval(interval: &PeriodInterval) -> SuggestedRange {
    SuggestedRange {
        start_date: interval.start(),
        end_date: interval.end(),
        sequence_number: interval.number(),
        display_name: interval.display_name(),
    }
}

/// The canonical slot immediately after an existing period's slot.
pub(crate) fn slot_after(
    period: &Period,
    periodicity: Periodicity,
) -> Result<PeriodInterval, ReconError> {
    let number: i32 = sequence_number(period.start_date, periodicity);
    let cycle: AnnualCycle = AnnualCycle::new(period.start_date.year(), periodicity);
    let current: PeriodInterval = cycle.interval(number)?;
    Ok(cycle.following(&current)?)
}

/// The canonical slot containing a given date.
fn slot_containing(today: Date, periodicity: Periodicity) -> Result<PeriodInterval, ReconError> {
    let number: i32 = sequence_number(today, periodicity);
    let cycle: AnnualCycle = AnnualCycle::new(today.year(), periodicity);
    Ok(cycle.interval(number)?)
}

/// Decides what the caller should do with the company's ledger today.
///
/// Runs the diagnostic and the heal first, then partitions the ledger:
/// exactly one active period means resume; more than one means the
/// ledger is ambiguous and gets flagged for diagnosis; none means the
/// next (or first) canonical slot is suggested for creation. A company
/// whose settings cannot be resolved is an emergency.
#[allow(clippy::too_many_lines)]
pub fn detect_current_period_status(
    store: &mut PayrollStore,
    company_id: &CompanyId,
    today: Date,
) -> DetectionStatus {
    let periodicity: Periodicity = match store.default_periodicity(company_id) {
        Ok(periodicity) => periodicity,
        Err(e) => {
            return DetectionStatus::bare(
                DetectionAction::Emergency,
                format!("Could not resolve company {company_id}: {e}"),
            );
        }
    };

    let report: DiagnosticReport = run_diagnostic(store, company_id);
    if !report.is_clean() {
        tracing::warn!(
            company = %company_id,
            issues = report.issues.len(),
            "Detection running over a ledger with open issues"
        );
    }

    let heal: HealOutcome = auto_heal(store, company_id);
    if !heal.healed_period_ids.is_empty() {
        tracing::info!(
            company = %company_id,
            healed = heal.healed_period_ids.len(),
            "Healed periods before detection"
        );
    }

    let periods: Vec<Period> = match store.list_periods(company_id, periodicity) {
        Ok(periods) => periods,
        Err(e) => {
            return DetectionStatus::bare(
                DetectionAction::Emergency,
                format!("Could not load the period ledger: {e}"),
            );
        }
    };

    let active: Vec<&Period> = periods.iter().filter(|p| p.state.is_active()).collect();
    match active.as_slice() {
        [only] => {
            return DetectionStatus {
                action: DetectionAction::Resume,
                period: Some((*only).clone()),
                suggested_range: None,
                message: format!(
                    "Active period {:?} ({} to {})",
                    only.display_name, only.start_date, only.end_date
                ),
            };
        }
        [] => {}
        many => {
            return DetectionStatus::bare(
                DetectionAction::Diagnose,
                format!(
                    "{} active periods; the ledger is ambiguous and needs repair",
                    many.len()
                ),
            );
        }
    }

    let last_settled: Option<&Period> = periods
        .iter()
        .filter(|p| p.state.is_settled())
        .max_by_key(|p| p.end_date);
    if let Some(last) = last_settled {
        return match slot_after(last, periodicity) {
            Ok(next) => DetectionStatus {
                action: DetectionAction::Create,
                period: None,
                suggested_range: Some(range_from_interval(&next)),
                message: format!(
                    "Last settled period ended {}; next slot is {} to {}",
                    last.end_date,
                    next.start(),
                    next.end()
                ),
            },
            Err(e) => DetectionStatus::bare(
                DetectionAction::Diagnose,
                format!("Could not derive the slot after period {}: {e}", last.id),
            ),
        };
    }

    if periods.is_empty() {
        return match slot_containing(today, periodicity) {
            Ok(first) => DetectionStatus {
                action: DetectionAction::Create,
                period: None,
                suggested_range: Some(range_from_interval(&first)),
                message: format!(
                    "Empty ledger; first {periodicity} slot containing {today} is {} to {}",
                    first.start(),
                    first.end()
                ),
            },
            Err(e) => DetectionStatus::bare(
                DetectionAction::Diagnose,
                format!("Could not derive the slot containing {today}: {e}"),
            ),
        };
    }

    DetectionStatus::bare(
        DetectionAction::Diagnose,
        "Periods exist but none is active or settled".to_string(),
    )
}

/// Creates the suggested period as a zero-aggregate draft.
///
/// # Errors
///
/// Returns an error if the company's settings cannot be resolved or the
/// insert fails.
pub fn create_period_from_suggestion(
    store: &mut PayrollStore,
    company_id: &CompanyId,
    range: &SuggestedRange,
) -> Result<Period, ReconError> {
    let periodicity: Periodicity = store.default_periodicity(company_id)?;
    let input: NewPeriod = NewPeriod::zeroed_draft(
        company_id.clone(),
        periodicity,
        range.start_date,
        range.end_date,
        range.sequence_number,
        range.display_name.clone(),
    );
    let period: Period = store.insert_period(&input)?;
    tracing::info!(
        period = period.id,
        company = %company_id,
        start = %range.start_date,
        end = %range.end_date,
        "Created period from suggestion"
    );
    Ok(period)
}
