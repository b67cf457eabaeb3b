// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Core ledger types: companies, periodicities, periods, and payroll records.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::Date;

/// Identifies a company owning a payroll ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(String);

impl CompanyId {
    /// Creates a new company identifier.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cadence of payroll periods within an annual cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Periodicity {
    /// One period per ISO week (52 per cycle).
    Weekly,
    /// Two periods per calendar month (24 per cycle).
    Biweekly,
    /// One period per calendar month (12 per cycle).
    Monthly,
}

impl Periodicity {
    /// Number of periods in a full annual cycle.
    #[must_use]
    pub const fn cycle_length(self) -> i32 {
        match self {
            Self::Weekly => 52,
            Self::Biweekly => 24,
            Self::Monthly => 12,
        }
    }

    /// Returns the stored token for the `tipo_periodo` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    /// Parses a stored `tipo_periodo` token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a known periodicity.
    pub fn parse(token: &str) -> Result<Self, DomainError> {
        match token {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(DomainError::UnknownPeriodicity(other.to_string())),
        }
    }
}

impl std::fmt::Display for Periodicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodState {
    /// Created but not yet worked on.
    Draft,
    /// Liquidation in progress.
    InProgress,
    /// Closed; aggregates are final unless reopened.
    Closed,
    /// Closed and approved.
    Approved,
    /// Reopened after closure for corrections.
    Reopened,
    /// Canceled; kept only until a corrective pass removes it.
    Canceled,
}

impl PeriodState {
    /// Returns the stored token for the `estado` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Approved => "approved",
            Self::Reopened => "reopened",
            Self::Canceled => "canceled",
        }
    }

    /// Parses a stored `estado` token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a known lifecycle state.
    pub fn parse(token: &str) -> Result<Self, DomainError> {
        match token {
            "draft" => Ok(Self::Draft),
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            "approved" => Ok(Self::Approved),
            "reopened" => Ok(Self::Reopened),
            "canceled" => Ok(Self::Canceled),
            other => Err(DomainError::UnknownPeriodState(other.to_string())),
        }
    }

    /// A period the company is currently working in.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Draft | Self::InProgress)
    }

    /// A period whose liquidation has concluded.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Closed | Self::Approved)
    }

    /// Rank used when collapsing duplicate periods: the highest-priority
    /// member of a duplicate group survives.
    ///
    /// Closed outranks everything, canceled ranks last; approved and
    /// reopened slot beside their lifecycle neighbors.
    #[must_use]
    pub const fn retention_priority(self) -> u8 {
        match self {
            Self::Closed => 6,
            Self::Approved => 5,
            Self::InProgress => 4,
            Self::Reopened => 3,
            Self::Draft => 2,
            Self::Canceled => 1,
        }
    }
}

impl std::fmt::Display for PeriodState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of a single employee's payroll record within a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordState {
    /// Not yet processed.
    Draft,
    /// Computed but not closed.
    Processed,
    /// Closed.
    Closed,
    /// Closed and paid out.
    Paid,
}

impl RecordState {
    /// Returns the stored token for the record `estado` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Processed => "processed",
            Self::Closed => "closed",
            Self::Paid => "paid",
        }
    }

    /// Parses a stored record `estado` token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a known record state.
    pub fn parse(token: &str) -> Result<Self, DomainError> {
        match token {
            "draft" => Ok(Self::Draft),
            "processed" => Ok(Self::Processed),
            "closed" => Ok(Self::Closed),
            "paid" => Ok(Self::Paid),
            other => Err(DomainError::UnknownRecordState(other.to_string())),
        }
    }

    /// Whether the record has advanced past draft.
    #[must_use]
    pub const fn is_beyond_draft(self) -> bool {
        !matches!(self, Self::Draft)
    }
}

/// A monetary amount in integer cents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Amount(i64);

impl Amount {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from integer cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the amount in integer cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns an error on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(DomainError::AmountOverflow)
    }
}

/// A payroll period: one bounded interval of a company's annual cycle.
///
/// `sequence_number` and `display_name` are stored values; the canonical
/// values are recomputed from the date range by the reconciliation engine,
/// which treats any disagreement as a repairable inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Datastore row id.
    pub id: i64,
    /// Owning company.
    pub company_id: CompanyId,
    /// Cadence this period belongs to.
    pub periodicity: Periodicity,
    /// Start date (inclusive).
    pub start_date: Date,
    /// End date (inclusive).
    pub end_date: Date,
    /// Stored 1-based index within the annual cycle; null when never assigned.
    pub sequence_number: Option<i32>,
    /// Stored display name (the `periodo` column).
    pub display_name: String,
    /// Lifecycle state.
    pub state: PeriodState,
    /// Count of non-draft payroll records at last aggregation.
    pub employee_count: i32,
    /// Aggregated gross pay.
    pub gross_total: Amount,
    /// Aggregated deductions.
    pub deductions_total: Amount,
    /// Aggregated net pay.
    pub net_total: Amount,
    /// Creation timestamp (ISO-8601 text, as stored).
    pub created_at: String,
    /// Last-update timestamp (ISO-8601 text, as stored).
    pub updated_at: String,
}

impl Period {
    /// Lexicographic recency key over the stored ISO-8601 timestamps,
    /// with the row id as a final tie-break.
    #[must_use]
    pub fn recency_key(&self) -> (&str, i64) {
        (self.updated_at.as_str(), self.id)
    }
}

/// A single employee's payroll record, owned by a period.
///
/// The reconciliation engine only reads these; they are created and
/// mutated by the liquidation workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Datastore row id.
    pub id: i64,
    /// Owning period.
    pub period_id: i64,
    /// Employee identifier.
    pub employee_id: String,
    /// Record state.
    pub state: RecordState,
    /// Gross pay.
    pub gross_pay: Amount,
    /// Deductions.
    pub deductions: Amount,
    /// Net pay.
    pub net_pay: Amount,
}
