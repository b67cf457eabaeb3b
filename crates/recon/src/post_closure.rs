// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Post-closure verification.
//!
//! Closure propagates asynchronously from the liquidation workflow, so
//! the period row may lag behind the caller's view of it. Verification
//! polls with linear backoff under a hard wall-clock bound, then
//! proposes the next canonical range, skipping slots that already hold
//! a period.

use crate::error::ReconError;
use crate::report::{ClosureOutcome, SuggestedRange};
use nomina_domain::{AnnualCycle, CompanyId, Period, PeriodInterval, PeriodState, Periodicity};
use nomina_persistence::PayrollStore;
use std::time::Duration;
use tokio::time::{sleep, timeout};

const MAX_VERIFY_ATTEMPTS: u32 = 5;
const BACKOFF_UNIT: Duration = Duration::from_millis(1000);
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

async fn poll_for_closure(store: &mut PayrollStore, period_id: i64) -> Result<Period, String> {
    let mut last_state: Option<PeriodState> = None;

    for attempt in 1..=MAX_VERIFY_ATTEMPTS {
        match store.get_period(period_id) {
            Ok(Some(period)) if period.state == PeriodState::Closed => {
                tracing::debug!(period = period_id, attempt, "Closure verified");
                return Ok(period);
            }
            Ok(Some(period)) => {
                tracing::debug!(
                    period = period_id,
                    attempt,
                    state = %period.state,
                    "Period not yet closed"
                );
                last_state = Some(period.state);
            }
            Ok(None) => {
                return Err(format!("Period {period_id} not found"));
            }
            Err(e) => {
                tracing::warn!(period = period_id, attempt, error = %e, "Poll failed");
            }
        }
        if attempt < MAX_VERIFY_ATTEMPTS {
            sleep(BACKOFF_UNIT * attempt).await;
        }
    }

    Err(match last_state {
        Some(state) => format!(
            "Period {period_id} still {state} after {MAX_VERIFY_ATTEMPTS} attempts"
        ),
        None => format!("Period {period_id} unreadable after {MAX_VERIFY_ATTEMPTS} attempts"),
    })
}

/// Proposes the first canonical slot after `closed` that no period
/// already occupies, scanning at most one full cycle ahead.
fn next_available_range(
    store: &mut PayrollStore,
    company_id: &CompanyId,
    closed: &Period,
    periodicity: Periodicity,
) -> Result<SuggestedRange, String> {
    let to_msg = |e: ReconError| e.to_string();

    let mut candidate: PeriodInterval =
        crate::detection::slot_after(closed, periodicity).map_err(to_msg)?;
    let scan_limit: i32 = AnnualCycle::new(closed.start_date.year(), periodicity).len();

    for _ in 0..scan_limit {
        match store.find_period_by_range(
            company_id,
            periodicity,
            candidate.start(),
            candidate.end(),
        ) {
            Ok(None) => {
                return Ok(SuggestedRange {
                    start_date: candidate.start(),
                    end_date: candidate.end(),
                    sequence_number: candidate.number(),
                    display_name: candidate.display_name(),
                });
            }
            Ok(Some(existing)) => {
                tracing::debug!(
                    occupied_by = existing.id,
                    start = %candidate.start(),
                    end = %candidate.end(),
                    "Slot occupied, trying the next one"
                );
                let cycle: AnnualCycle =
                    AnnualCycle::new(candidate.start().year(), periodicity);
                candidate = cycle
                    .following(&candidate)
                    .map_err(|e| ReconError::from(e).to_string())?;
            }
            Err(e) => {
                return Err(format!("Collision check failed: {e}"));
            }
        }
    }

    Err(format!(
        "No free slot within {scan_limit} slots after period {}",
        closed.id
    ))
}

/// Verifies that a period reached `closed` and proposes the next range.
///
/// Polls the period up to five times with linear backoff, the whole
/// verification bounded by a ten-second timeout. On verified closure the
/// next canonical range is computed with collision avoidance. Every
/// failure mode returns a structured outcome; nothing propagates as an
/// error.
pub async fn verify_closure_and_detect_next(
    store: &mut PayrollStore,
    period_id: i64,
    company_id: &CompanyId,
) -> ClosureOutcome {
    let polled: Result<Result<Period, String>, _> =
        timeout(VERIFY_TIMEOUT, poll_for_closure(store, period_id)).await;

    let period: Period = match polled {
        Ok(Ok(period)) => period,
        Ok(Err(message)) => return ClosureOutcome::failure(message),
        Err(_) => {
            return ClosureOutcome::failure(format!(
                "Verification of period {period_id} timed out after {}s",
                VERIFY_TIMEOUT.as_secs()
            ));
        }
    };

    let periodicity: Periodicity = match store.default_periodicity(company_id) {
        Ok(periodicity) => periodicity,
        Err(e) => {
            let message: String = format!("Could not resolve settings for company {company_id}");
            return ClosureOutcome {
                success: false,
                message,
                period: Some(period),
                next_range: None,
                errors: vec![e.to_string()],
            };
        }
    };

    match next_available_range(store, company_id, &period, periodicity) {
        Ok(range) => ClosureOutcome {
            success: true,
            message: format!(
                "Period {period_id} verified closed; next slot is {} to {}",
                range.start_date, range.end_date
            ),
            period: Some(period),
            next_range: Some(range),
            errors: Vec::new(),
        },
        Err(message) => ClosureOutcome {
            success: false,
            message: message.clone(),
            period: Some(period),
            next_range: None,
            errors: vec![message],
        },
    }
}
