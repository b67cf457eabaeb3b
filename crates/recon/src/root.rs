// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Root corrective pass.
//!
//! The deep repair for a ledger the standard pass cannot fix: six
//! phases, each committing independently, ending in a validation that
//! reloads everything and asserts the numbering invariants. A crash
//! between phases leaves a valid intermediate state; re-running the
//! pass converges, and a second run on a repaired ledger touches
//! nothing.

use crate::diagnostic::conflict_groups;
use crate::report::{NumberingConflict, RootCorrectionResult};
use crate::resolver::retention_order;
use crate::session::SessionContext;
use nomina_domain::{
    AnnualCycle, CompanyId, Period, PeriodInterval, PeriodState, Periodicity, sequence_number,
};
use nomina_persistence::{NewPeriod, PayrollStore, PersistenceError};
use std::collections::BTreeSet;
use time::Date;

/// Whether a period's date range has a shape no canonical interval of
/// its periodicity can have.
///
/// Cross-month ranges are anomalous, with one exception: a biweekly
/// second half starting on day 16 may end in the immediately following
/// month. Weekly ranges legitimately cross months and are exempt.
pub(crate) fn is_anomalous_range(period: &Period) -> bool {
    let start: Date = period.start_date;
    let end: Date = period.end_date;
    let same_month: bool = start.year() == end.year() && start.month() == end.month();

    match period.periodicity {
        Periodicity::Weekly => false,
        Periodicity::Monthly => !same_month,
        Periodicity::Biweekly => {
            if same_month {
                return false;
            }
            let start_ordinal: i32 = start.year() * 12 + i32::from(u8::from(start.month()));
            let end_ordinal: i32 = end.year() * 12 + i32::from(u8::from(end.month()));
            !(start.day() == 16 && end_ordinal == start_ordinal + 1)
        }
    }
}

fn load_periods(
    store: &mut PayrollStore,
    ctx: &SessionContext,
) -> Result<Vec<Period>, PersistenceError> {
    store.list_periods(ctx.company_id(), ctx.periodicity())
}

/// Phase 1: describe every numbering conflict and which member would be
/// kept, without writing anything yet.
fn detect_conflicts(periods: &[Period], result: &mut RootCorrectionResult) {
    let conflicts: Vec<NumberingConflict> = conflict_groups(periods);
    if conflicts.is_empty() {
        result.log("Phase 1: no numbering conflicts".to_string());
        return;
    }

    for conflict in &conflicts {
        let members: Vec<&Period> = periods
            .iter()
            .filter(|p| conflict.period_ids.contains(&p.id))
            .collect();

        // The correct member is the one whose start date actually maps
        // to the contested number; closed state then recency break ties.
        let mut candidates: Vec<&Period> = members
            .iter()
            .copied()
            .filter(|p| sequence_number(p.start_date, p.periodicity) == conflict.sequence_number)
            .collect();
        if candidates.is_empty() {
            candidates = members.clone();
        }
        candidates.sort_by(|a, b| retention_order(a, b));

        if let Some(correct) = candidates.first() {
            result.log(format!(
                "Phase 1: number {} of {} contested by {} periods; period {} ({} to {}, {}) is the legitimate holder",
                conflict.sequence_number,
                conflict.cycle_year,
                members.len(),
                correct.id,
                correct.start_date,
                correct.end_date,
                correct.state
            ));
        }
    }
}

/// Phase 2: record every stored number that disagrees with its canonical
/// recomputation. Feeds phase 4; corrects nothing itself.
fn validate_numbers(periods: &[Period], result: &mut RootCorrectionResult) {
    let mut mismatches: usize = 0;
    for period in periods {
        if let Some(stored) = period.sequence_number {
            let canonical: i32 = sequence_number(period.start_date, period.periodicity);
            if stored != canonical {
                mismatches += 1;
                result.log(format!(
                    "Phase 2: period {} starting {} stores number {stored}, canonical is {canonical}",
                    period.id, period.start_date
                ));
            }
        } else {
            mismatches += 1;
            result.log(format!(
                "Phase 2: period {} starting {} has no number",
                period.id, period.start_date
            ));
        }
    }
    result.log(format!("Phase 2: {mismatches} date/number mismatches"));
}

/// Phase 3: delete canceled periods and periods whose range shape is
/// impossible for the periodicity.
fn cleanup_anomalies(
    store: &mut PayrollStore,
    periods: &[Period],
    result: &mut RootCorrectionResult,
) {
    let mut deleted: usize = 0;
    for period in periods {
        let reason: &str = if period.state == PeriodState::Canceled {
            "canceled"
        } else if is_anomalous_range(period) {
            "anomalous range"
        } else {
            continue;
        };

        match store.delete_period(period.id) {
            Ok(()) => {
                deleted += 1;
                result.log(format!(
                    "Phase 3: deleted period {} ({} to {}): {reason}",
                    period.id, period.start_date, period.end_date
                ));
                tracing::info!(period = period.id, reason, "Deleted period");
            }
            Err(e) => {
                result
                    .errors
                    .push(format!("Could not delete period {}: {e}", period.id));
            }
        }
    }
    result.periods_deleted += deleted;
    result.log(format!("Phase 3: {deleted} periods deleted"));
}

/// Phase 4: for every conflict group surviving cleanup, persist each
/// member's canonical number.
fn resolve_conflicts(
    store: &mut PayrollStore,
    ctx: &SessionContext,
    result: &mut RootCorrectionResult,
) {
    let periods: Vec<Period> = match load_periods(store, ctx) {
        Ok(periods) => periods,
        Err(e) => {
            result
                .errors
                .push(format!("Phase 4 could not load periods: {e}"));
            return;
        }
    };

    let conflicts: Vec<NumberingConflict> = conflict_groups(&periods);
    for conflict in &conflicts {
        let mut renumbered: usize = 0;
        let mut group_failed: bool = false;
        for period in periods
            .iter()
            .filter(|p| conflict.period_ids.contains(&p.id))
        {
            let canonical: i32 = sequence_number(period.start_date, ctx.periodicity());
            if period.sequence_number == Some(canonical) {
                continue;
            }
            match store.update_sequence_number(period.id, canonical) {
                Ok(()) => {
                    renumbered += 1;
                    result.periods_updated += 1;
                    result.log(format!(
                        "Phase 4: period {} renumbered {:?} -> {canonical}",
                        period.id, period.sequence_number
                    ));
                }
                Err(e) => {
                    group_failed = true;
                    result
                        .errors
                        .push(format!("Could not renumber period {}: {e}", period.id));
                }
            }
        }
        // A group only counts as resolved when something actually moved
        // and nothing in it failed.
        if renumbered > 0 && !group_failed {
            result.conflicts_resolved += 1;
        } else if renumbered == 0 && !group_failed {
            result.log(format!(
                "Phase 4: number {} of {} is held by periods that all map to it; renumbering cannot dissolve the group",
                conflict.sequence_number, conflict.cycle_year
            ));
        }
    }
    result.log(format!(
        "Phase 4: {} conflict groups processed",
        conflicts.len()
    ));
}

/// Phase 5: fill every missing canonical slot of the cycle with a draft
/// period carrying zero aggregates.
fn generate_missing(
    store: &mut PayrollStore,
    ctx: &mut SessionContext,
    result: &mut RootCorrectionResult,
) {
    let periods: Vec<Period> = match load_periods(store, ctx) {
        Ok(periods) => periods,
        Err(e) => {
            result
                .errors
                .push(format!("Phase 5 could not load periods: {e}"));
            return;
        }
    };

    let Some(year) = periods.iter().map(|p| p.start_date.year()).max() else {
        result.log("Phase 5: empty ledger, nothing to anchor the cycle to".to_string());
        return;
    };

    let cycle: AnnualCycle = AnnualCycle::new(year, ctx.periodicity());
    // Numbers restart every year; only the anchor year's periods can
    // occupy the anchor year's slots.
    let existing: BTreeSet<i32> = periods
        .iter()
        .filter(|p| p.start_date.year() == year)
        .filter_map(|p| p.sequence_number)
        .collect();

    let mut created: usize = 0;
    for number in 1..=cycle.len() {
        if existing.contains(&number) {
            continue;
        }
        let interval: PeriodInterval = match cycle.interval(number) {
            Ok(interval) => interval,
            Err(e) => {
                result
                    .errors
                    .push(format!("Could not derive interval {number} of {year}: {e}"));
                continue;
            }
        };
        let input: NewPeriod = NewPeriod::zeroed_draft(
            ctx.company_id().clone(),
            ctx.periodicity(),
            interval.start(),
            interval.end(),
            interval.number(),
            ctx.name_for(interval.start(), interval.end()),
        );
        match store.insert_period(&input) {
            Ok(period) => {
                created += 1;
                result.log(format!(
                    "Phase 5: created period {} for missing slot {number} ({} to {})",
                    period.id,
                    interval.start(),
                    interval.end()
                ));
            }
            Err(e) => {
                result
                    .errors
                    .push(format!("Could not create period for slot {number}: {e}"));
            }
        }
    }
    result.periods_created += created;
    result.log(format!("Phase 5: {created} missing periods created"));
}

/// Phase 6: reload everything and assert the numbering invariants.
/// Returns the itemized failures.
fn final_validation(
    store: &mut PayrollStore,
    ctx: &SessionContext,
    result: &mut RootCorrectionResult,
) -> Vec<String> {
    let periods: Vec<Period> = match load_periods(store, ctx) {
        Ok(periods) => periods,
        Err(e) => {
            return vec![format!("Final validation could not load periods: {e}")];
        }
    };

    let mut failures: Vec<String> = Vec::new();
    let cycle_length: i32 = ctx.periodicity().cycle_length();
    let mut seen: BTreeSet<(i32, i32)> = BTreeSet::new();

    for period in &periods {
        let Some(stored) = period.sequence_number else {
            failures.push(format!("Period {} still has no number", period.id));
            continue;
        };
        let year: i32 = period.start_date.year();
        if !seen.insert((year, stored)) {
            failures.push(format!(
                "Number {stored} is still held by more than one period in {year}"
            ));
        }
        if stored < 1 || stored > cycle_length {
            failures.push(format!(
                "Period {} holds number {stored}, outside 1..{cycle_length}",
                period.id
            ));
        }
        let canonical: i32 = sequence_number(period.start_date, ctx.periodicity());
        if stored != canonical {
            failures.push(format!(
                "Period {} holds number {stored} but its start {} maps to {canonical}",
                period.id, period.start_date
            ));
        }
    }

    result.log(format!(
        "Phase 6: {} periods validated, {} failures",
        periods.len(),
        failures.len()
    ));
    failures
}

/// Runs the six-phase root corrective pass for one company.
///
/// Never fails: every problem, including a final validation that does
/// not hold, is reported through the result object. `success` is true
/// only when no unit failed and the final validation held.
pub fn execute_root_correction(
    store: &mut PayrollStore,
    company_id: &CompanyId,
) -> RootCorrectionResult {
    let mut result: RootCorrectionResult = RootCorrectionResult::new();
    result.log(format!("Root correction for company {company_id}"));

    let periodicity: Periodicity = match store.default_periodicity(company_id) {
        Ok(periodicity) => periodicity,
        Err(e) => {
            result.errors.push(e.to_string());
            result.message = format!("Could not resolve settings for company {company_id}");
            return result;
        }
    };
    let mut ctx: SessionContext = SessionContext::new(company_id.clone(), periodicity);

    let periods: Vec<Period> = match load_periods(store, &ctx) {
        Ok(periods) => periods,
        Err(e) => {
            result.errors.push(e.to_string());
            result.message = "Could not load the period ledger".to_string();
            return result;
        }
    };
    result.log(format!(
        "Loaded {} periods ({periodicity} cycle)",
        periods.len()
    ));

    detect_conflicts(&periods, &mut result);
    validate_numbers(&periods, &mut result);
    cleanup_anomalies(store, &periods, &mut result);
    resolve_conflicts(store, &ctx, &mut result);
    generate_missing(store, &mut ctx, &mut result);
    let validation_failures: Vec<String> = final_validation(store, &ctx, &mut result);

    result.errors.extend(validation_failures);
    result.success = result.errors.is_empty();
    result.message = if result.success {
        format!(
            "Root correction complete: {} deleted, {} updated, {} created, {} conflicts resolved",
            result.periods_deleted,
            result.periods_updated,
            result.periods_created,
            result.conflicts_resolved
        )
    } else {
        format!("Root correction finished with {} errors", result.errors.len())
    };

    tracing::info!(
        company = %company_id,
        success = result.success,
        deleted = result.periods_deleted,
        updated = result.periods_updated,
        created = result.periods_created,
        "Root correction finished"
    );

    result
}
