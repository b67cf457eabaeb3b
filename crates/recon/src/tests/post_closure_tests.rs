// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{canonical_period, seeded_store};
use crate::post_closure::verify_closure_and_detect_next;
use crate::report::{ClosureOutcome, SuggestedRange};
use nomina_domain::{Period, PeriodState, Periodicity};
use time::macros::date;

#[tokio::test(start_paused = true)]
async fn test_closed_period_verifies_on_first_attempt() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    let closed: Period = store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 15),
            PeriodState::Closed,
        ))
        .unwrap();

    let outcome: ClosureOutcome =
        verify_closure_and_detect_next(&mut store, closed.id, &company).await;

    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.period.unwrap().id, closed.id);
    let range: SuggestedRange = outcome.next_range.unwrap();
    assert_eq!(range.start_date, date!(2025 - 01 - 16));
    assert_eq!(range.end_date, date!(2025 - 01 - 31));
    assert_eq!(range.sequence_number, 2);
}

#[tokio::test(start_paused = true)]
async fn test_occupied_slots_are_skipped() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    let closed: Period = store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 15),
            PeriodState::Closed,
        ))
        .unwrap();
    // Slots 2 and 3 already exist; the suggestion must land on slot 4.
    store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 01 - 16),
            date!(2025 - 01 - 31),
            PeriodState::Approved,
        ))
        .unwrap();
    store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 02 - 01),
            date!(2025 - 02 - 15),
            PeriodState::Approved,
        ))
        .unwrap();

    let outcome: ClosureOutcome =
        verify_closure_and_detect_next(&mut store, closed.id, &company).await;

    assert!(outcome.success, "errors: {:?}", outcome.errors);
    let range: SuggestedRange = outcome.next_range.unwrap();
    assert_eq!(range.start_date, date!(2025 - 02 - 16));
    assert_eq!(range.end_date, date!(2025 - 02 - 28));
    assert_eq!(range.sequence_number, 4);
}

#[tokio::test(start_paused = true)]
async fn test_year_end_closure_suggests_next_years_first_slot() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    let closed: Period = store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 12 - 16),
            date!(2025 - 12 - 31),
            PeriodState::Closed,
        ))
        .unwrap();

    let outcome: ClosureOutcome =
        verify_closure_and_detect_next(&mut store, closed.id, &company).await;

    assert!(outcome.success, "errors: {:?}", outcome.errors);
    let range: SuggestedRange = outcome.next_range.unwrap();
    assert_eq!(range.start_date, date!(2026 - 01 - 01));
    assert_eq!(range.end_date, date!(2026 - 01 - 15));
    assert_eq!(range.sequence_number, 1);
    assert_eq!(range.display_name, "1 - 15 Enero 2026");
}

#[tokio::test(start_paused = true)]
async fn test_period_that_never_closes_fails_structurally() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    let stuck: Period = store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 15),
            PeriodState::InProgress,
        ))
        .unwrap();

    let outcome: ClosureOutcome =
        verify_closure_and_detect_next(&mut store, stuck.id, &company).await;

    assert!(!outcome.success);
    assert!(outcome.period.is_none());
    assert!(outcome.next_range.is_none());
    assert!(!outcome.errors.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_missing_period_fails_without_retrying() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);

    let outcome: ClosureOutcome =
        verify_closure_and_detect_next(&mut store, 9999, &company).await;

    assert!(!outcome.success);
    assert!(outcome.message.contains("not found"));
}

#[tokio::test(start_paused = true)]
async fn test_missing_settings_still_return_the_verified_period() {
    let (mut store, company) = seeded_store(Periodicity::Biweekly);
    let closed: Period = store
        .insert_period(&canonical_period(
            &company,
            Periodicity::Biweekly,
            date!(2025 - 01 - 01),
            date!(2025 - 01 - 15),
            PeriodState::Closed,
        ))
        .unwrap();
    // Simulate a company whose settings row disappeared after closure.
    let other: nomina_domain::CompanyId = nomina_domain::CompanyId::new("ghost-co");

    let outcome: ClosureOutcome =
        verify_closure_and_detect_next(&mut store, closed.id, &other).await;

    assert!(!outcome.success);
    assert!(outcome.period.is_some());
    assert!(outcome.next_range.is_none());
}
