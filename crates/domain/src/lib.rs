// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and canonical calculations for the nomina payroll ledger.
//!
//! Everything in this crate is pure: deterministic functions over dates and
//! periodicities, with no I/O and no clock access. The persistence and
//! reconciliation crates build on these primitives.

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

mod cycle;
mod error;
mod naming;
mod types;

pub use cycle::{AnnualCycle, PeriodInterval, is_standard_start, sequence_number};
pub use error::DomainError;
pub use naming::{NameCache, display_name, month_name};
pub use types::{
    Amount, CompanyId, PayrollRecord, Period, PeriodState, Periodicity, RecordState,
};
