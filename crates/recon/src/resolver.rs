// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Standard corrective pass.
//!
//! Four steps run strictly in order, each committing its own writes:
//! collapse duplicate ranges, ensure a baseline period exists, renumber,
//! rename. There is no transaction spanning steps; each step is
//! idempotent, so re-running the pass after a partial failure converges
//! on the same final state. On an already-correct ledger every counter
//! comes back zero.

use crate::diagnostic::conflict_groups;
use crate::report::{ConflictResolutionResult, StepResult};
use crate::session::SessionContext;
use nomina_domain::{
    AnnualCycle, CompanyId, Period, PeriodInterval, Periodicity, sequence_number,
};
use nomina_persistence::{NewPeriod, PayrollStore};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use time::Date;

/// One idempotent unit of a corrective pass.
///
/// Steps collect their own unit-level failures into the returned
/// [`StepResult`] and keep going; they never abort the pipeline.
pub trait CorrectionStep {
    /// Step name as it appears in results and logs.
    fn name(&self) -> &'static str;

    /// Applies the step against the store.
    fn apply(&self, store: &mut PayrollStore, ctx: &mut SessionContext) -> StepResult;
}

/// Orders duplicate-group members so the survivor sorts first.
///
/// Higher retention priority wins; within equal priority the most
/// recently updated row wins.
pub(crate) fn retention_order(a: &Period, b: &Period) -> Ordering {
    b.state
        .retention_priority()
        .cmp(&a.state.retention_priority())
        .then_with(|| b.recency_key().cmp(&a.recency_key()))
}

/// Collapses groups of periods sharing an identical date range down to
/// their highest-priority member.
pub struct CleanupDuplicates;

impl CorrectionStep for CleanupDuplicates {
    fn name(&self) -> &'static str {
        "cleanup_duplicates"
    }

    fn apply(&self, store: &mut PayrollStore, ctx: &mut SessionContext) -> StepResult {
        let mut result: StepResult = StepResult::new(self.name());

        let periods: Vec<Period> = match store.list_periods(ctx.company_id(), ctx.periodicity()) {
            Ok(periods) => periods,
            Err(e) => {
                result.errors.push(format!("Could not load periods: {e}"));
                return result;
            }
        };

        let mut by_range: BTreeMap<(Date, Date), Vec<Period>> = BTreeMap::new();
        for period in periods {
            by_range
                .entry((period.start_date, period.end_date))
                .or_default()
                .push(period);
        }

        for mut members in by_range.into_values() {
            if members.len() < 2 {
                continue;
            }
            members.sort_by(retention_order);
            let survivor: i64 = members[0].id;
            for loser in &members[1..] {
                match store.delete_period(loser.id) {
                    Ok(()) => {
                        result.periods_deleted += 1;
                        tracing::info!(
                            kept = survivor,
                            deleted = loser.id,
                            state = %loser.state,
                            "Collapsed duplicate period"
                        );
                    }
                    Err(e) => {
                        result
                            .errors
                            .push(format!("Could not delete duplicate period {}: {e}", loser.id));
                    }
                }
            }
        }

        result
    }
}

/// Creates the cycle's first period when no period carries number 1.
///
/// The cycle year is anchored to the latest period on record; an empty
/// ledger has nothing to anchor to and is left for the detection
/// service, which creates the first period from "today".
pub struct EnsureBaseline;

impl CorrectionStep for EnsureBaseline {
    fn name(&self) -> &'static str {
        "ensure_baseline"
    }

    fn apply(&self, store: &mut PayrollStore, ctx: &mut SessionContext) -> StepResult {
        let mut result: StepResult = StepResult::new(self.name());

        let periods: Vec<Period> = match store.list_periods(ctx.company_id(), ctx.periodicity()) {
            Ok(periods) => periods,
            Err(e) => {
                result.errors.push(format!("Could not load periods: {e}"));
                return result;
            }
        };

        let Some(year) = periods.iter().map(|p| p.start_date.year()).max() else {
            return result;
        };
        // Numbers restart every year; only the anchor year's number 1
        // counts as a baseline.
        if periods
            .iter()
            .any(|p| p.start_date.year() == year && p.sequence_number == Some(1))
        {
            return result;
        }

        let first: PeriodInterval =
            match AnnualCycle::new(year, ctx.periodicity()).interval(1) {
                Ok(interval) => interval,
                Err(e) => {
                    result
                        .errors
                        .push(format!("Could not derive the first interval of {year}: {e}"));
                    return result;
                }
            };

        let input: NewPeriod = NewPeriod::zeroed_draft(
            ctx.company_id().clone(),
            ctx.periodicity(),
            first.start(),
            first.end(),
            first.number(),
            ctx.name_for(first.start(), first.end()),
        );
        match store.insert_period(&input) {
            Ok(created) => {
                result.periods_created += 1;
                tracing::info!(period = created.id, year, "Created baseline period 1");
            }
            Err(e) => {
                result
                    .errors
                    .push(format!("Could not create baseline period for {year}: {e}"));
            }
        }

        result
    }
}

/// Rewrites every stored sequence number that disagrees with the
/// canonical recomputation from the start date.
pub struct RenumberPeriods;

impl CorrectionStep for RenumberPeriods {
    fn name(&self) -> &'static str {
        "renumber_periods"
    }

    fn apply(&self, store: &mut PayrollStore, ctx: &mut SessionContext) -> StepResult {
        let mut result: StepResult = StepResult::new(self.name());

        let periods: Vec<Period> = match store.list_periods(ctx.company_id(), ctx.periodicity()) {
            Ok(periods) => periods,
            Err(e) => {
                result.errors.push(format!("Could not load periods: {e}"));
                return result;
            }
        };

        for period in &periods {
            let canonical: i32 = sequence_number(period.start_date, ctx.periodicity());
            if period.sequence_number == Some(canonical) {
                continue;
            }
            match store.update_sequence_number(period.id, canonical) {
                Ok(()) => {
                    result.periods_updated += 1;
                    tracing::info!(
                        period = period.id,
                        stored = ?period.sequence_number,
                        canonical,
                        "Renumbered period"
                    );
                }
                Err(e) => {
                    result
                        .errors
                        .push(format!("Could not renumber period {}: {e}", period.id));
                }
            }
        }

        result
    }
}

/// Rewrites every stored display name that disagrees with the canonical
/// name of the period's date range.
pub struct RenamePeriods;

impl CorrectionStep for RenamePeriods {
    fn name(&self) -> &'static str {
        "rename_periods"
    }

    fn apply(&self, store: &mut PayrollStore, ctx: &mut SessionContext) -> StepResult {
        let mut result: StepResult = StepResult::new(self.name());

        let periods: Vec<Period> = match store.list_periods(ctx.company_id(), ctx.periodicity()) {
            Ok(periods) => periods,
            Err(e) => {
                result.errors.push(format!("Could not load periods: {e}"));
                return result;
            }
        };

        for period in &periods {
            let canonical: String = ctx.name_for(period.start_date, period.end_date);
            if period.display_name == canonical {
                continue;
            }
            match store.update_display_name(period.id, &canonical) {
                Ok(()) => {
                    result.periods_updated += 1;
                    tracing::info!(
                        period = period.id,
                        from = %period.display_name,
                        to = %canonical,
                        "Renamed period"
                    );
                }
                Err(e) => {
                    result
                        .errors
                        .push(format!("Could not rename period {}: {e}", period.id));
                }
            }
        }

        result
    }
}

/// The standard pipeline, in its fixed order.
#[must_use]
pub fn standard_steps() -> Vec<Box<dyn CorrectionStep>> {
    vec![
        Box::new(CleanupDuplicates),
        Box::new(EnsureBaseline),
        Box::new(RenumberPeriods),
        Box::new(RenamePeriods),
    ]
}

fn count_conflict_groups(store: &mut PayrollStore, ctx: &SessionContext) -> usize {
    store
        .list_periods(ctx.company_id(), ctx.periodicity())
        .map_or(0, |periods| conflict_groups(&periods).len())
}

/// Runs the standard four-step corrective pass for one company.
///
/// Never fails: a company whose settings cannot be resolved yields a
/// failure result, and unit-level failures inside the steps are
/// collected into `errors` while the pass continues.
pub fn resolve_all_conflicts(
    store: &mut PayrollStore,
    company_id: &CompanyId,
) -> ConflictResolutionResult {
    let periodicity: Periodicity = match store.default_periodicity(company_id) {
        Ok(periodicity) => periodicity,
        Err(e) => {
            return ConflictResolutionResult::failure(
                format!("Could not resolve settings for company {company_id}"),
                e.to_string(),
            );
        }
    };
    let mut ctx: SessionContext = SessionContext::new(company_id.clone(), periodicity);

    let conflicts_before: usize = count_conflict_groups(store, &ctx);

    let mut duplicates_removed: usize = 0;
    let mut periods_created: usize = 0;
    let mut periods_updated: usize = 0;
    let mut errors: Vec<String> = Vec::new();

    for step in standard_steps() {
        tracing::debug!(step = step.name(), company = %company_id, "Applying step");
        let outcome: StepResult = step.apply(store, &mut ctx);
        if outcome.step == "cleanup_duplicates" {
            duplicates_removed += outcome.periods_deleted;
        }
        periods_created += outcome.periods_created;
        periods_updated += outcome.periods_updated;
        errors.extend(outcome.errors);
    }

    let conflicts_after: usize = count_conflict_groups(store, &ctx);
    let conflicts_resolved: usize = conflicts_before.saturating_sub(conflicts_after);

    let success: bool = errors.is_empty();
    let message: String = if success {
        format!(
            "Corrective pass complete: {duplicates_removed} duplicates removed, \
             {periods_created} created, {periods_updated} updated, \
             {conflicts_resolved} conflicts resolved"
        )
    } else {
        format!("Corrective pass finished with {} errors", errors.len())
    };

    ConflictResolutionResult {
        success,
        message,
        duplicates_removed,
        periods_created,
        periods_updated,
        conflicts_resolved,
        errors,
    }
}
