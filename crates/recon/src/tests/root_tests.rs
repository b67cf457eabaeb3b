// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{canonical_period, ledger, raw_period, seeded_store};
use crate::report::RootCorrectionResult;
use crate::root::execute_root_correction;
use nomina_domain::{Period, PeriodState, Periodicity};
use std::collections::BTreeSet;
use time::macros::date;

fn assert_numbering_invariants(periods: &[Period], cycle_length: i32) {
    let mut seen: BTreeSet<(i32, i32)> = BTreeSet::new();
    for period in periods {
        let number: i32 = period.sequence_number.unwrap();
        assert!(
            (1..=cycle_length).contains(&number),
            "period {} holds out-of-range number {number}",
            period.id
        );
        assert!(
            seen.insert((period.start_date.year(), number)),
            "number {number} held by more than one period in {}",
            period.start_date.year()
        );
    }
}

#[test]
fn test_contested_number_is_renumbered_and_cycle_completed() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    let legitimate: Period = store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 03 - 01),
            date!(2025 - 03 - 15),
            PeriodState::Closed,
        ))
        .unwrap();
    // Same stored number, but the range maps to slot 6.
    let intruder: Period = store
        .insert_period(&raw_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 03 - 16),
            date!(2025 - 03 - 31),
            Some(5),
            "16 - 31 Marzo 2025",
            PeriodState::Draft,
        ))
        .unwrap();

    let result: RootCorrectionResult = execute_root_correction(&mut store, &company);

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.conflicts_resolved, 1);
    assert_eq!(result.periods_updated, 1);
    assert_eq!(result.periods_deleted, 0);
    assert_eq!(result.periods_created, 22);

    let periods: Vec<Period> = ledger(&mut store, &company, Periodicity::Biweekly);
    assert_eq!(periods.len(), 24);
    assert_numbering_invariants(&periods, 24);

    let kept: &Period = periods.iter().find(|p| p.id == legitimate.id).unwrap();
    assert_eq!(kept.sequence_number, Some(5));
    assert_eq!(kept.state, PeriodState::Closed);

    let moved: &Period = periods.iter().find(|p| p.id == intruder.id).unwrap();
    assert_eq!(moved.sequence_number, Some(6));
}

#[test]
fn test_anomalous_cross_month_period_is_deleted() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 03 - 01),
            date!(2025 - 03 - 15),
            PeriodState::Closed,
        ))
        .unwrap();
    // Crosses into April without starting on day 16: no canonical
    // biweekly interval has this shape.
    let anomalous: Period = store
        .insert_period(&raw_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 03 - 20),
            date!(2025 - 04 - 03),
            Some(5),
            "20 - 3 Marzo 2025",
            PeriodState::Draft,
        ))
        .unwrap();

    let result: RootCorrectionResult = execute_root_correction(&mut store, &company);

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.periods_deleted, 1);
    assert!(store.get_period(anomalous.id).unwrap().is_none());

    let periods: Vec<Period> = ledger(&mut store, &company, Periodicity::Biweekly);
    assert_eq!(periods.len(), 24);
    assert_numbering_invariants(&periods, 24);
    // The vacated slot 6 was refilled with the canonical range.
    let slot_six: &Period = periods
        .iter()
        .find(|p| p.sequence_number == Some(6))
        .unwrap();
    assert_eq!(slot_six.start_date, date!(2025 - 03 - 16));
    assert_eq!(slot_six.end_date, date!(2025 - 03 - 31));
    assert_eq!(slot_six.state, PeriodState::Draft);
}

#[test]
fn test_second_half_crossing_into_next_month_is_kept() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    // The one allowed cross-month shape: a second half starting day 16.
    let kept: Period = store
        .insert_period(&raw_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 01 - 16),
            date!(2025 - 02 - 01),
            Some(2),
            "16 - 1 Enero 2025",
            PeriodState::Closed,
        ))
        .unwrap();

    let result: RootCorrectionResult = execute_root_correction(&mut store, &company);

    assert_eq!(result.periods_deleted, 0);
    assert!(store.get_period(kept.id).unwrap().is_some());
    assert!(result.success, "errors: {:?}", result.errors);
}

#[test]
fn test_canceled_periods_are_deleted() {
    let (mut store, company) = seeded_store(Periodicity::Monthly);
    store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Monthly,
            date!(2025 - 05 - 01),
            date!(2025 - 05 - 31),
            PeriodState::Closed,
        ))
        .unwrap();
    let canceled: Period = store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Monthly,
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
            PeriodState::Canceled,
        ))
        .unwrap();

    let result: RootCorrectionResult = execute_root_correction(&mut store, &company);

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.periods_deleted, 1);
    assert!(store.get_period(canceled.id).unwrap().is_none());

    let periods: Vec<Period> = ledger(&mut store, &company, Periodicity::Monthly);
    assert_eq!(periods.len(), 12);
    assert_numbering_invariants(&periods, 12);
}

#[test]
fn test_root_correction_is_idempotent() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 03 - 01),
            date!(2025 - 03 - 15),
            PeriodState::Closed,
        ))
        .unwrap();
    store
        .insert_period(&raw_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 03 - 16),
            date!(2025 - 03 - 31),
            Some(5),
            "16 - 31 Marzo 2025",
            PeriodState::Draft,
        ))
        .unwrap();

    let first: RootCorrectionResult = execute_root_correction(&mut store, &company);
    assert!(first.success);

    let second: RootCorrectionResult = execute_root_correction(&mut store, &company);
    assert!(second.success, "errors: {:?}", second.errors);
    assert_eq!(second.periods_created, 0);
    assert_eq!(second.periods_updated, 0);
    assert_eq!(second.periods_deleted, 0);
    assert_eq!(second.conflicts_resolved, 0);
}

#[test]
fn test_year_rollover_is_not_condemned() {
    let (mut store, company) = seeded_store(Periodicity::Monthly);
    // A complete 2025 plus the January 2026 period the detection
    // service itself suggests; number 1 is legitimately held twice.
    for month in 1u8..=12 {
        let start: time::Date =
            time::Date::from_calendar_date(2025, time::Month::try_from(month).unwrap(), 1)
                .unwrap();
        let end: time::Date = start
            .replace_day(start.month().length(2025))
            .unwrap();
        store
            .insert_period(&canonical_period(
                &company,
                Periodicity::Monthly,
                start,
                end,
                PeriodState::Closed,
            ))
            .unwrap();
    }
    store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Monthly,
            date!(2026 - 01 - 01),
            date!(2026 - 01 - 31),
            PeriodState::InProgress,
        ))
        .unwrap();

    let result: RootCorrectionResult = execute_root_correction(&mut store, &company);

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.conflicts_resolved, 0);
    assert_eq!(result.periods_deleted, 0);
    assert_eq!(result.periods_updated, 0);
    // Phase 5 anchors to 2026 and fills the rest of that cycle.
    assert_eq!(result.periods_created, 11);

    let periods: Vec<Period> = ledger(&mut store, &company, Periodicity::Monthly);
    assert_eq!(periods.len(), 24);
    assert_numbering_invariants(&periods, 12);

    let second: RootCorrectionResult = execute_root_correction(&mut store, &company);
    assert!(second.success, "errors: {:?}", second.errors);
    assert_eq!(second.periods_created, 0);
    assert_eq!(second.periods_updated, 0);
    assert_eq!(second.periods_deleted, 0);
    assert_eq!(second.conflicts_resolved, 0);
}

#[test]
fn test_unresolvable_conflict_group_is_not_counted_as_resolved() {
    let (mut store, company) = seeded_store(Periodicity::Monthly);
    // Two periods over the identical range both map to slot 6;
    // renumbering cannot separate them.
    for _ in 0..2 {
        store
            .insert_period(&canonical_period(
                &company,
                Periodicity::Monthly,
                date!(2025 - 06 - 01),
                date!(2025 - 06 - 30),
                PeriodState::Closed,
            ))
            .unwrap();
    }

    let result: RootCorrectionResult = execute_root_correction(&mut store, &company);

    assert!(!result.success);
    assert_eq!(result.conflicts_resolved, 0);
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.contains("more than one period")),
        "errors: {:?}",
        result.errors
    );
}

#[test]
fn test_empty_ledger_is_a_no_op() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);

    let result: RootCorrectionResult = execute_root_correction(&mut store, &company);

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.periods_created, 0);
    assert!(ledger(&mut store, &company, Periodicity::Biweekly).is_empty());
}

#[test]
fn test_detailed_log_narrates_every_phase() {
    let (mut store, company) = seeded_store(Periodicity::Monthly);
    store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Monthly,
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 31),
            PeriodState::Closed,
        ))
        .unwrap();

    let result: RootCorrectionResult = execute_root_correction(&mut store, &company);

    for phase in ["Phase 2", "Phase 3", "Phase 4", "Phase 5", "Phase 6"] {
        assert!(
            result.detailed_log.iter().any(|l| l.contains(phase)),
            "missing {phase} in log: {:?}",
            result.detailed_log
        );
    }
}
