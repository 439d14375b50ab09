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

//! Counterparty amounts held by the era fan-out maps.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{codec::json_bigint, AccountingError};

/// Amount staked with a single counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEntry {
    pub id: String,
    #[serde(with = "json_bigint")]
    pub amount: U256,
}

/// A list of counterparty amounts and their total.
///
/// `total` always equals the sum of the entry amounts, and no entry holds a
/// zero amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeList {
    pub entries: Vec<StakeEntry>,
    #[serde(with = "json_bigint")]
    pub total: U256,
}

impl StakeList {
    pub fn get(&self, id: &str) -> Option<U256> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.amount)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, id: &str, amount: U256) -> Result<(), AccountingError> {
        let total = self.total.checked_add(amount).ok_or(AccountingError::Overflow)?;
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.amount = entry.amount.checked_add(amount).ok_or(AccountingError::Overflow)?;
            }
            None => self.entries.push(StakeEntry { id: id.to_string(), amount }),
        }
        self.total = total;
        self.entries.retain(|e| !e.amount.is_zero());
        Ok(())
    }

    /// Remove `amount` from the counterparty `id`, dropping the entry once it
    /// reaches zero. Removing more than the entry holds is an underflow.
    pub fn remove(&mut self, id: &str, amount: U256) -> Result<(), AccountingError> {
        let position = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AccountingError::UnknownCounterparty(id.to_string()))?;

        let entry = &mut self.entries[position];
        let remaining = entry
            .amount
            .checked_sub(amount)
            .ok_or(AccountingError::Underflow { existing: entry.amount, delta: amount })?;
        let total = self
            .total
            .checked_sub(amount)
            .ok_or(AccountingError::Underflow { existing: self.total, delta: amount })?;
        entry.amount = remaining;
        self.total = total;
        if remaining.is_zero() {
            self.entries.remove(position);
        }
        Ok(())
    }
}
