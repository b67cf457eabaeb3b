// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain calculations and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Failed to parse a date from its stored text form.
    DateParse {
        /// The invalid date string.
        value: String,
        /// The parsing error message.
        reason: String,
    },
    /// A sequence number is outside the annual cycle.
    InvalidSequenceNumber {
        /// The invalid sequence number.
        number: i32,
        /// The cycle length (maximum valid number).
        max: i32,
    },
    /// A periodicity token is not one of weekly/biweekly/monthly.
    UnknownPeriodicity(String),
    /// A period state token is not a known lifecycle state.
    UnknownPeriodState(String),
    /// A payroll record state token is not a known state.
    UnknownRecordState(String),
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Monetary aggregation overflowed.
    AmountOverflow,
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateParse { value, reason } => {
                write!(f, "Failed to parse date '{value}': {reason}")
            }
            Self::InvalidSequenceNumber { number, max } => {
                write!(
                    f,
                    "Invalid sequence number: {number}. Must be between 1 and {max}"
                )
            }
            Self::UnknownPeriodicity(token) => write!(f, "Unknown periodicity: '{token}'"),
            Self::UnknownPeriodState(token) => write!(f, "Unknown period state: '{token}'"),
            Self::UnknownRecordState(token) => {
                write!(f, "Unknown payroll record state: '{token}'")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::AmountOverflow => write!(f, "Monetary aggregation overflowed"),
        }
    }
}

impl std::error::Error for DomainError {}
