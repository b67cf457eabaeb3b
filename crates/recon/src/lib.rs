// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reconciliation engine for the nomina payroll ledger.
//!
//! Keeps a company's period ledger consistent with its canonical
//! invariants: deterministic numbering, unique date ranges, a complete
//! annual cycle, and period states that agree with their payroll
//! records. The engine recovers from an already-corrupted ledger
//! without a transaction spanning its corrective phases; every phase is
//! idempotent and commits independently, so a pass interrupted midway
//! is safe to re-run.
//!
//! Public operations:
//! - [`run_diagnostic`]: read-only inspection, never writes.
//! - [`auto_heal`]: explicit state-consistency repair of draft periods.
//! - [`resolve_all_conflicts`]: the standard four-step corrective pass.
//! - [`execute_root_correction`]: the six-phase deep repair.
//! - [`detect_current_period_status`]: resume/create/diagnose decision.
//! - [`create_period_from_suggestion`]: materialize a suggested range.
//! - [`verify_closure_and_detect_next`]: post-closure verification.
//!
//! None of these propagate errors past their boundary except
//! [`create_period_from_suggestion`]; everything else reports failures
//! through its result object.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod detection;
mod diagnostic;
mod error;
mod post_closure;
mod report;
mod resolver;
mod root;
mod session;

#[cfg(test)]
mod tests;

pub use detection::{auto_heal, create_period_from_suggestion, detect_current_period_status};
pub use diagnostic::run_diagnostic;
pub use error::ReconError;
pub use post_closure::verify_closure_and_detect_next;
pub use report::{
    ClosureOutcome, ConflictResolutionResult, DetectionAction, DetectionStatus, DiagnosticReport,
    DuplicateGroup, HealOutcome, NumberingConflict, RootCorrectionResult, StepResult,
    SuggestedRange,
};
pub use resolver::{
    CleanupDuplicates, CorrectionStep, EnsureBaseline, RenamePeriods, RenumberPeriods,
    resolve_all_conflicts, standard_steps,
};
pub use root::execute_root_correction;
pub use session::SessionContext;
