// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-pass reconciliation session.
//!
//! Each corrective pass owns one session: the company under repair, the
//! periodicity resolved from its settings, and a name cache scoped to the
//! pass. The cache dies with the session; nothing here is shared across
//! invocations.

use nomina_domain::{CompanyId, NameCache, Periodicity};
use time::Date;

/// Context threaded through the steps of one corrective pass.
#[derive(Debug)]
pub struct SessionContext {
    company_id: CompanyId,
    periodicity: Periodicity,
    names: NameCache,
}

impl SessionContext {
    /// Opens a session for one company and its resolved periodicity.
    #[must_use]
    pub fn new(company_id: CompanyId, periodicity: Periodicity) -> Self {
        Self {
            company_id,
            periodicity,
            names: NameCache::new(),
        }
    }

    /// The company under repair.
    #[must_use]
    pub const fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    /// The periodicity resolved from the company's settings.
    #[must_use]
    pub const fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    /// Canonical display name for a range, memoized for the session.
    /// The underlying [`NameCache`] owns invalidation; the session dies
    /// with the pass and never carries names across invocations.
    pub fn name_for(&mut self, start: Date, end: Date) -> String {
        self.names.name_for(start, end)
    }
}
