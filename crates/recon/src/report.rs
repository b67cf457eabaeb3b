// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Result objects returned by the public reconciliation operations.
//!
//! Every operation returns one of these instead of propagating errors
//! past its boundary. Unit-level failures land in the `errors` list of
//! the operation that observed them, and the operation keeps going.

use nomina_domain::{CompanyId, Period};
use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;

/// Periods sharing an identical (start, end) range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Shared start date.
    pub start_date: Date,
    /// Shared end date.
    pub end_date: Date,
    /// Row ids of every member, in start-date load order.
    pub period_ids: Vec<i64>,
}

/// Periods of one cycle year sharing a stored sequence number.
///
/// Numbers restart at 1 every year, so the same number held in two
/// different years is not a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberingConflict {
    /// Year of the annual cycle the number belongs to.
    pub cycle_year: i32,
    /// The contested sequence number.
    pub sequence_number: i32,
    /// Row ids of every member, in start-date load order.
    pub period_ids: Vec<i64>,
}

/// Read-only findings over one company's ledger.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    /// Company the report describes.
    pub company_id: CompanyId,
    /// Everything found wrong, human-readable.
    pub issues: Vec<String>,
    /// Suggested corrective actions.
    pub recommendations: Vec<String>,
    /// Period count per lifecycle state token.
    pub state_distribution: BTreeMap<String, usize>,
    /// Groups of periods with identical date ranges.
    pub duplicates: Vec<DuplicateGroup>,
    /// Groups of periods with the same stored sequence number.
    pub conflicts: Vec<NumberingConflict>,
    /// Whether the sequence calculator passed its self-test suite.
    pub calculator_ok: bool,
}

impl DiagnosticReport {
    /// An empty report for a company, before any checks have run.
    #[must_use]
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            issues: Vec::new(),
            recommendations: Vec::new(),
            state_distribution: BTreeMap::new(),
            duplicates: Vec::new(),
            conflicts: Vec::new(),
            calculator_ok: true,
        }
    }

    /// Whether the ledger passed every check.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
            && self.duplicates.is_empty()
            && self.conflicts.is_empty()
            && self.calculator_ok
    }
}

/// Outcome of one step of the standard corrective pass.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// The step that produced this result.
    pub step: String,
    /// Periods deleted by the step.
    pub periods_deleted: usize,
    /// Periods created by the step.
    pub periods_created: usize,
    /// Periods updated by the step.
    pub periods_updated: usize,
    /// Unit-level failures the step observed and skipped past.
    pub errors: Vec<String>,
}

impl StepResult {
    /// An all-zero result for a named step.
    #[must_use]
    pub fn new(step: &str) -> Self {
        Self {
            step: step.to_string(),
            periods_deleted: 0,
            periods_created: 0,
            periods_updated: 0,
            errors: Vec::new(),
        }
    }
}

/// Outcome of the standard four-step corrective pass.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictResolutionResult {
    /// Whether the pass completed without unit failures.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Duplicate periods deleted.
    pub duplicates_removed: usize,
    /// Periods created (baseline fill).
    pub periods_created: usize,
    /// Periods renumbered or renamed.
    pub periods_updated: usize,
    /// Numbering-conflict groups eliminated by the pass.
    pub conflicts_resolved: usize,
    /// Unit-level failures collected across all steps.
    pub errors: Vec<String>,
}

impl ConflictResolutionResult {
    /// A failure result carrying a single error.
    #[must_use]
    pub fn failure(message: String, error: String) -> Self {
        Self {
            success: false,
            message,
            duplicates_removed: 0,
            periods_created: 0,
            periods_updated: 0,
            conflicts_resolved: 0,
            errors: vec![error],
        }
    }
}

/// Outcome of the six-phase root corrective pass.
#[derive(Debug, Clone, Serialize)]
pub struct RootCorrectionResult {
    /// Whether every phase completed and the final validation held.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Numbering-conflict groups processed.
    pub conflicts_resolved: usize,
    /// Anomalous or canceled periods deleted.
    pub periods_deleted: usize,
    /// Periods renumbered.
    pub periods_updated: usize,
    /// Missing canonical slots filled.
    pub periods_created: usize,
    /// Unit-level failures and final-validation issues.
    pub errors: Vec<String>,
    /// Phase-by-phase narration of what the pass did and why.
    pub detailed_log: Vec<String>,
}

impl RootCorrectionResult {
    /// An empty result, before any phase has run.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            success: false,
            message: String::new(),
            conflicts_resolved: 0,
            periods_deleted: 0,
            periods_updated: 0,
            periods_created: 0,
            errors: Vec::new(),
            detailed_log: Vec::new(),
        }
    }

    /// Appends a line to the detailed log.
    pub fn log(&mut self, line: String) {
        self.detailed_log.push(line);
    }
}

impl Default for RootCorrectionResult {
    fn default() -> Self {
        Self::new()
    }
}

/// What the detection service decided the caller should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionAction {
    /// Exactly one active period exists; continue working in it.
    Resume,
    /// No active period; create the suggested one.
    Create,
    /// The ledger is ambiguous; run diagnostics before writing.
    Diagnose,
    /// The company itself could not be resolved.
    Emergency,
}

/// A canonical date range proposed for a new period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedRange {
    /// Start date (inclusive).
    pub start_date: Date,
    /// End date (inclusive).
    pub end_date: Date,
    /// Canonical sequence number of the slot.
    pub sequence_number: i32,
    /// Canonical display name of the slot.
    pub display_name: String,
}

/// Decision produced by the detection service.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionStatus {
    /// The decided action.
    pub action: DetectionAction,
    /// The period to resume, when `action` is [`DetectionAction::Resume`].
    pub period: Option<Period>,
    /// The range to create, when `action` is [`DetectionAction::Create`].
    pub suggested_range: Option<SuggestedRange>,
    /// Human-readable explanation of the decision.
    pub message: String,
}

impl DetectionStatus {
    /// A bare status carrying only an action and a message.
    #[must_use]
    pub const fn bare(action: DetectionAction, message: String) -> Self {
        Self {
            action,
            period: None,
            suggested_range: None,
            message,
        }
    }
}

/// Outcome of the explicit state-consistency heal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealOutcome {
    /// Row ids of periods promoted to closed.
    pub healed_period_ids: Vec<i64>,
    /// Unit-level failures; each leaves its period untouched.
    pub errors: Vec<String>,
}

/// Outcome of post-closure verification.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureOutcome {
    /// Whether the period was verified closed and a next range found.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// The verified period, when verification succeeded.
    pub period: Option<Period>,
    /// The next available canonical range, on full success.
    pub next_range: Option<SuggestedRange>,
    /// Failures observed along the way.
    pub errors: Vec<String>,
}

impl ClosureOutcome {
    /// A failure outcome with no verified period.
    #[must_use]
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message: message.clone(),
            period: None,
            next_range: None,
            errors: vec![message],
        }
    }
}
