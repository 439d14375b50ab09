// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Values that change either instantly or at the start of the next era.
//!
//! An [EraValue] carries the amount effective during `era` (`value`) and the
//! amount that becomes effective once the era advances (`value_after`). Every
//! mutation goes through [EraValue::merge], which first rolls a stale value
//! forward to the current era and then applies the delta.
//!
//! The merge has no deduplication key. Applying the same event twice applies
//! its delta twice, so callers must only feed it events delivered exactly once.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{codec::json_bigint, AccountingError};

/// Era marker for values that were created before any era was known.
pub const UNSET_ERA: i64 = -1;

/// How a delta combines with the stored amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Sub,
    Replace,
}

impl Operation {
    pub fn apply(self, existing: U256, delta: U256) -> Result<U256, AccountingError> {
        match self {
            Operation::Add => existing.checked_add(delta).ok_or(AccountingError::Overflow),
            Operation::Sub => {
                existing.checked_sub(delta).ok_or(AccountingError::Underflow { existing, delta })
            }
            Operation::Replace => Ok(delta),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraValue {
    pub era: i64,
    #[serde(with = "json_bigint")]
    pub value: U256,
    #[serde(with = "json_bigint")]
    pub value_after: U256,
}

impl Default for EraValue {
    fn default() -> Self {
        Self::unset()
    }
}

impl EraValue {
    /// A zero value that is not attached to any era yet.
    pub fn unset() -> Self {
        Self { era: UNSET_ERA, value: U256::ZERO, value_after: U256::ZERO }
    }

    /// Amount in effect during `era`.
    ///
    /// Once the stored era is behind, the deferred amount has taken over.
    pub fn effective_at(&self, era: u64) -> U256 {
        if self.era >= era_to_i64(era) {
            self.value
        } else {
            self.value_after
        }
    }

    /// Derive the next value from `existing` after applying `delta`.
    ///
    /// With `apply_instantly` the delta also changes the amount of the current
    /// era, otherwise it only changes the amount effective from the next era.
    pub fn merge(
        existing: Option<&EraValue>,
        delta: U256,
        op: Operation,
        apply_instantly: bool,
        current_era: u64,
    ) -> Result<EraValue, AccountingError> {
        let era = era_to_i64(current_era);
        let Some(existing) = existing else {
            let value_after = op.apply(U256::ZERO, delta)?;
            let value = if apply_instantly { value_after } else { U256::ZERO };
            return Ok(EraValue { era, value, value_after });
        };

        if existing.era > era {
            return Err(AccountingError::EraRegression { stored: existing.era, current: current_era });
        }

        // A value last touched in an earlier era first catches up to the boundary.
        let base = if existing.era == era { existing.value } else { existing.value_after };
        let value = if apply_instantly { op.apply(base, delta)? } else { base };
        let value_after = op.apply(existing.value_after, delta)?;

        Ok(EraValue { era, value, value_after })
    }
}

fn era_to_i64(era: u64) -> i64 {
    i64::try_from(era).unwrap_or(i64::MAX)
}
