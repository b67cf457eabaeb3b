// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Canonical display names for payroll periods.
//!
//! The `periodo` column is user-facing and Spanish-facing; the canonical
//! name is a pure function of the date range. Standard biweekly halves get
//! the two fixed shapes, everything else falls back to a generic range.

use std::collections::HashMap;
use time::{Date, Month};

/// Spanish month name as it appears in period display names.
#[must_use]
pub const fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Enero",
        Month::February => "Febrero",
        Month::March => "Marzo",
        Month::April => "Abril",
        Month::May => "Mayo",
        Month::June => "Junio",
        Month::July => "Julio",
        Month::August => "Agosto",
        Month::September => "Septiembre",
        Month::October => "Octubre",
        Month::November => "Noviembre",
        Month::December => "Diciembre",
    }
}

/// Computes the canonical display name for a period's date range.
///
/// - A first half (day 1 through day 15): `"1 - 15 {Month} {Year}"`.
/// - A second half (starting day 16): `"16 - {endDay} {Month} {Year}"`.
/// - Anything else: `"{startDay} - {endDay} {Month} {Year}"`.
///
/// The month and year are taken from the start date.
#[must_use]
pub fn display_name(start: Date, end: Date) -> String {
    let month: &str = month_name(start.month());
    let year: i32 = start.year();

    if start.day() == 1 && end.day() == 15 {
        format!("1 - 15 {month} {year}")
    } else if start.day() == 16 {
        format!("16 - {} {month} {year}", end.day())
    } else {
        format!("{} - {} {month} {year}", start.day(), end.day())
    }
}

/// Per-session memo of computed display names.
///
/// One cache instance belongs to one reconciliation session and is
/// dropped (or explicitly invalidated) with it; it is never shared
/// process-wide.
#[derive(Debug, Default)]
pub struct NameCache {
    entries: HashMap<(Date, Date), String>,
}

impl NameCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical name for a range, computing and memoizing
    /// it on first use.
    pub fn name_for(&mut self, start: Date, end: Date) -> String {
        self.entries
            .entry((start, end))
            .or_insert_with(|| display_name(start, end))
            .clone()
    }

    /// Drops all memoized names.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    /// Number of memoized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
