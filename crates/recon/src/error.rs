// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Engine-boundary errors.
//!
//! Most public operations in this crate convert failures into their
//! result objects instead of returning `Err`; this type exists for the
//! few entry points with a genuinely fallible signature.

use nomina_domain::DomainError;
use nomina_persistence::PersistenceError;
use thiserror::Error;

/// Errors crossing the reconciliation engine boundary.
#[derive(Debug, Error)]
pub enum ReconError {
    /// The datastore rejected an operation.
    #[error("Persistence failure: {0}")]
    Store(#[from] PersistenceError),

    /// A canonical calculation failed.
    #[error("Domain failure: {0}")]
    Domain(#[from] DomainError),
}
