// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Canonical annual cycle model.
//!
//! This module defines the authoritative numbering of payroll periods
//! within a calendar year, in both directions: a start date maps to its
//! canonical sequence number, and a sequence number maps back to its
//! canonical date interval. Stored values that disagree with these
//! functions are, by definition, corrupt.

use crate::error::DomainError;
use crate::naming;
use crate::types::Periodicity;
use serde::{Deserialize, Serialize};
use time::{Date, Month, Weekday};

/// Computes the canonical sequence number for a period starting on
/// `start_date` under the given periodicity.
///
/// - Biweekly: two slots per month; day 1–15 is the first half, day 16
///   onward the second, so `(month - 1) * 2 + half`.
/// - Monthly: the calendar month number.
/// - Weekly: the ISO week number of the start date.
///
/// The function is total over valid dates. Start days other than 1 or 16
/// under biweekly still produce a number; callers flag those via
/// [`is_standard_start`] rather than treating them as errors.
#[must_use]
pub fn sequence_number(start_date: Date, periodicity: Periodicity) -> i32 {
    match periodicity {
        Periodicity::Biweekly => {
            let months_completed: i32 = i32::from(u8::from(start_date.month())) - 1;
            let half: i32 = if start_date.day() <= 15 { 1 } else { 2 };
            months_completed * 2 + half
        }
        Periodicity::Monthly => i32::from(u8::from(start_date.month())),
        Periodicity::Weekly => i32::from(start_date.iso_week()),
    }
}

/// Whether `start_date` falls on a canonical interval boundary.
///
/// Biweekly periods are expected to start on day 1 or 16, monthly periods
/// on day 1, weekly periods on Monday. A non-standard start is a warning
/// for diagnostics, never an error.
#[must_use]
pub fn is_standard_start(start_date: Date, periodicity: Periodicity) -> bool {
    match periodicity {
        Periodicity::Biweekly => start_date.day() == 1 || start_date.day() == 16,
        Periodicity::Monthly => start_date.day() == 1,
        Periodicity::Weekly => start_date.weekday() == Weekday::Monday,
    }
}

/// A canonical period interval within an annual cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInterval {
    /// The 1-based sequence number.
    number: i32,
    /// Start date (inclusive).
    start: Date,
    /// End date (inclusive).
    end: Date,
}

impl PeriodInterval {
    /// Returns the sequence number (1-based).
    #[must_use]
    pub const fn number(&self) -> i32 {
        self.number
    }

    /// Returns the start date (inclusive).
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the end date (inclusive).
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Canonical display name for this interval.
    #[must_use]
    pub fn display_name(&self) -> String {
        naming::display_name(self.start, self.end)
    }
}

/// The full set of canonical intervals covering one calendar year for a
/// given periodicity.
///
/// A biweekly cycle holds exactly 24 intervals, a monthly cycle 12. A
/// weekly cycle holds 52 or 53 depending on the ISO year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualCycle {
    /// The calendar year.
    year: i32,
    /// The cadence.
    periodicity: Periodicity,
}

impl AnnualCycle {
    /// Creates a cycle for the given year and periodicity.
    #[must_use]
    pub const fn new(year: i32, periodicity: Periodicity) -> Self {
        Self { year, periodicity }
    }

    /// Returns the calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the periodicity.
    #[must_use]
    pub const fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    /// Number of canonical slots in this cycle.
    ///
    /// Weekly cycles follow the ISO year length (52 or 53); the other
    /// periodicities use their fixed cycle length.
    #[must_use]
    pub fn len(&self) -> i32 {
        match self.periodicity {
            Periodicity::Weekly => i32::from(time::util::weeks_in_year(self.year)),
            other => other.cycle_length(),
        }
    }

    /// Whether a stored sequence number falls inside this cycle.
    #[must_use]
    pub fn contains(&self, number: i32) -> bool {
        number >= 1 && number <= self.len()
    }

    /// Derives the canonical interval for a sequence number, inverting
    /// the [`sequence_number`] formula.
    ///
    /// # Errors
    ///
    /// Returns an error if the number is outside the cycle or the date
    /// arithmetic fails.
    pub fn interval(&self, number: i32) -> Result<PeriodInterval, DomainError> {
        if !self.contains(number) {
            return Err(DomainError::InvalidSequenceNumber {
                number,
                max: self.len(),
            });
        }

        match self.periodicity {
            Periodicity::Biweekly => self.biweekly_interval(number),
            Periodicity::Monthly => self.monthly_interval(number),
            Periodicity::Weekly => self.weekly_interval(number),
        }
    }

    /// Derives every canonical interval of the cycle, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any interval derivation fails.
    pub fn intervals(&self) -> Result<Vec<PeriodInterval>, DomainError> {
        let mut all: Vec<PeriodInterval> =
            Vec::with_capacity(usize::try_from(self.len()).unwrap_or(0));
        for number in 1..=self.len() {
            all.push(self.interval(number)?);
        }
        Ok(all)
    }

    /// The canonical slot immediately after the given interval, rolling
    /// into slot 1 of the following year at the cycle boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the derivation fails.
    pub fn following(&self, interval: &PeriodInterval) -> Result<PeriodInterval, DomainError> {
        let next_number: i32 = interval.number() + 1;
        if next_number > self.len() {
            Self::new(self.year + 1, self.periodicity).interval(1)
        } else {
            self.interval(next_number)
        }
    }

    fn biweekly_interval(&self, number: i32) -> Result<PeriodInterval, DomainError> {
        let month_index: i32 = (number - 1) / 2 + 1;
        let month: Month = month_from_index(month_index)?;
        let is_first_half: bool = number % 2 == 1;

        let (start_day, end_day): (u8, u8) = if is_first_half {
            (1, 15)
        } else {
            (16, month.length(self.year))
        };

        Ok(PeriodInterval {
            number,
            start: calendar_date(self.year, month, start_day)?,
            end: calendar_date(self.year, month, end_day)?,
        })
    }

    fn monthly_interval(&self, number: i32) -> Result<PeriodInterval, DomainError> {
        let month: Month = month_from_index(number)?;
        Ok(PeriodInterval {
            number,
            start: calendar_date(self.year, month, 1)?,
            end: calendar_date(self.year, month, month.length(self.year))?,
        })
    }

    fn weekly_interval(&self, number: i32) -> Result<PeriodInterval, DomainError> {
        let week: u8 =
            u8::try_from(number).map_err(|_| DomainError::InvalidSequenceNumber {
                number,
                max: self.len(),
            })?;
        let start: Date = Date::from_iso_week_date(self.year, week, Weekday::Monday)
            .map_err(|e| DomainError::DateArithmeticOverflow {
                operation: format!("deriving ISO week {week} of {}: {e}", self.year),
            })?;
        let end: Date = start
            .checked_add(time::Duration::days(6))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("extending ISO week {week} of {}", self.year),
            })?;
        Ok(PeriodInterval { number, start, end })
    }
}

fn month_from_index(index: i32) -> Result<Month, DomainError> {
    let raw: u8 = u8::try_from(index).map_err(|_| DomainError::DateArithmeticOverflow {
        operation: format!("converting month index {index}"),
    })?;
    Month::try_from(raw).map_err(|e| DomainError::DateArithmeticOverflow {
        operation: format!("converting month index {index}: {e}"),
    })
}

fn calendar_date(year: i32, month: Month, day: u8) -> Result<Date, DomainError> {
    Date::from_calendar_date(year, month, day).map_err(|e| DomainError::DateArithmeticOverflow {
        operation: format!("constructing {year}-{month:?}-{day}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_biweekly_sequence_determinism() {
        assert_eq!(
            sequence_number(date!(2025 - 01 - 01), Periodicity::Biweekly),
            1
        );
        assert_eq!(
            sequence_number(date!(2025 - 01 - 16), Periodicity::Biweekly),
            2
        );
        assert_eq!(
            sequence_number(date!(2025 - 07 - 01), Periodicity::Biweekly),
            13
        );
        assert_eq!(
            sequence_number(date!(2025 - 12 - 16), Periodicity::Biweekly),
            24
        );
    }

    #[test]
    fn test_biweekly_sequence_non_standard_day() {
        // Day 20 is a second-half start; the number is still computed.
        assert_eq!(
            sequence_number(date!(2025 - 03 - 20), Periodicity::Biweekly),
            6
        );
        assert!(!is_standard_start(date!(2025 - 03 - 20), Periodicity::Biweekly));
        assert!(is_standard_start(date!(2025 - 03 - 16), Periodicity::Biweekly));
        assert!(is_standard_start(date!(2025 - 03 - 01), Periodicity::Biweekly));
    }

    #[test]
    fn test_monthly_sequence() {
        assert_eq!(
            sequence_number(date!(2025 - 01 - 01), Periodicity::Monthly),
            1
        );
        assert_eq!(
            sequence_number(date!(2025 - 06 - 01), Periodicity::Monthly),
            6
        );
        assert_eq!(
            sequence_number(date!(2025 - 12 - 01), Periodicity::Monthly),
            12
        );
    }

    #[test]
    fn test_weekly_sequence_iso_weeks() {
        // 2025-01-06 is the Monday of ISO week 2.
        assert_eq!(
            sequence_number(date!(2025 - 01 - 06), Periodicity::Weekly),
            2
        );
        // 2024-12-30 belongs to ISO week 1 of 2025.
        assert_eq!(
            sequence_number(date!(2024 - 12 - 30), Periodicity::Weekly),
            1
        );
    }

    #[test]
    fn test_biweekly_interval_inversion() {
        let cycle: AnnualCycle = AnnualCycle::new(2025, Periodicity::Biweekly);

        let first: PeriodInterval = cycle.interval(1).unwrap();
        assert_eq!(first.start(), date!(2025 - 01 - 01));
        assert_eq!(first.end(), date!(2025 - 01 - 15));

        let second: PeriodInterval = cycle.interval(2).unwrap();
        assert_eq!(second.start(), date!(2025 - 01 - 16));
        assert_eq!(second.end(), date!(2025 - 01 - 31));

        let fourth: PeriodInterval = cycle.interval(4).unwrap();
        assert_eq!(fourth.start(), date!(2025 - 02 - 16));
        assert_eq!(fourth.end(), date!(2025 - 02 - 28));

        let last: PeriodInterval = cycle.interval(24).unwrap();
        assert_eq!(last.start(), date!(2025 - 12 - 16));
        assert_eq!(last.end(), date!(2025 - 12 - 31));
    }

    #[test]
    fn test_biweekly_interval_round_trips_through_sequence() {
        let cycle: AnnualCycle = AnnualCycle::new(2025, Periodicity::Biweekly);
        for interval in cycle.intervals().unwrap() {
            assert_eq!(
                sequence_number(interval.start(), Periodicity::Biweekly),
                interval.number()
            );
        }
    }

    #[test]
    fn test_biweekly_leap_year_february() {
        let cycle: AnnualCycle = AnnualCycle::new(2024, Periodicity::Biweekly);
        let fourth: PeriodInterval = cycle.interval(4).unwrap();
        assert_eq!(fourth.end(), date!(2024 - 02 - 29));
    }

    #[test]
    fn test_monthly_interval() {
        let cycle: AnnualCycle = AnnualCycle::new(2025, Periodicity::Monthly);
        let june: PeriodInterval = cycle.interval(6).unwrap();
        assert_eq!(june.start(), date!(2025 - 06 - 01));
        assert_eq!(june.end(), date!(2025 - 06 - 30));
    }

    #[test]
    fn test_weekly_interval_monday_to_sunday() {
        let cycle: AnnualCycle = AnnualCycle::new(2025, Periodicity::Weekly);
        let second: PeriodInterval = cycle.interval(2).unwrap();
        assert_eq!(second.start(), date!(2025 - 01 - 06));
        assert_eq!(second.end(), date!(2025 - 01 - 12));
        assert_eq!(second.start().weekday(), Weekday::Monday);
    }

    #[test]
    fn test_cycle_lengths() {
        assert_eq!(AnnualCycle::new(2025, Periodicity::Biweekly).len(), 24);
        assert_eq!(AnnualCycle::new(2025, Periodicity::Monthly).len(), 12);
        // 2026 is a 53-week ISO year; 2025 is not.
        assert_eq!(AnnualCycle::new(2025, Periodicity::Weekly).len(), 52);
        assert_eq!(AnnualCycle::new(2026, Periodicity::Weekly).len(), 53);
    }

    #[test]
    fn test_interval_rejects_out_of_range() {
        let cycle: AnnualCycle = AnnualCycle::new(2025, Periodicity::Biweekly);
        assert!(matches!(
            cycle.interval(0),
            Err(DomainError::InvalidSequenceNumber { number: 0, max: 24 })
        ));
        assert!(matches!(
            cycle.interval(25),
            Err(DomainError::InvalidSequenceNumber {
                number: 25,
                max: 24
            })
        ));
    }

    #[test]
    fn test_following_rolls_over_year() {
        let cycle: AnnualCycle = AnnualCycle::new(2025, Periodicity::Biweekly);
        let last: PeriodInterval = cycle.interval(24).unwrap();
        let next: PeriodInterval = cycle.following(&last).unwrap();
        assert_eq!(next.number(), 1);
        assert_eq!(next.start(), date!(2026 - 01 - 01));
        assert_eq!(next.end(), date!(2026 - 01 - 15));
    }

    #[test]
    fn test_following_within_cycle() {
        let cycle: AnnualCycle = AnnualCycle::new(2025, Periodicity::Monthly);
        let june: PeriodInterval = cycle.interval(6).unwrap();
        let july: PeriodInterval = cycle.following(&june).unwrap();
        assert_eq!(july.number(), 7);
        assert_eq!(july.start(), date!(2025 - 07 - 01));
        assert_eq!(july.end(), date!(2025 - 07 - 31));
    }

    #[test]
    fn test_intervals_cover_cycle_without_overlap() {
        let cycle: AnnualCycle = AnnualCycle::new(2025, Periodicity::Biweekly);
        let intervals: Vec<PeriodInterval> = cycle.intervals().unwrap();
        assert_eq!(intervals.len(), 24);
        for pair in intervals.windows(2) {
            assert!(pair[0].end() < pair[1].start());
            assert_eq!(
                (pair[1].start() - pair[0].end()).whole_days(),
                1,
                "Gap between slots {} and {}",
                pair[0].number(),
                pair[1].number()
            );
        }
    }
}
