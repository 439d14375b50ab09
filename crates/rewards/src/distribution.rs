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

//! Proportional split of an indexer's era rewards across its delegators.

use alloy::primitives::U256;

use crate::{stake_list::StakeList, AccountingError};

/// Reward attributed to one delegator for one era.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatorShare {
    pub delegator: String,
    pub stake: U256,
    pub reward: U256,
}

/// Result of splitting one era's rewards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardSplit {
    pub shares: Vec<DelegatorShare>,
    /// Amount lost to floor division.
    pub remainder: U256,
}

/// Split `total_rewards - commission` across `stakes` proportionally to each
/// delegator's amount.
///
/// Shares are floored; the remainder stays with the protocol.
pub fn split_rewards(
    total_rewards: U256,
    commission: U256,
    stakes: &StakeList,
) -> Result<RewardSplit, AccountingError> {
    let distributable = total_rewards
        .checked_sub(commission)
        .ok_or(AccountingError::CommissionExceedsRewards { total_rewards, commission })?;

    let mut shares = Vec::with_capacity(stakes.entries.len());
    let mut distributed = U256::ZERO;
    for entry in &stakes.entries {
        let reward = share_of(distributable, entry.amount, stakes.total)?;
        distributed += reward;
        shares.push(DelegatorShare { delegator: entry.id.clone(), stake: entry.amount, reward });
    }

    Ok(RewardSplit { shares, remainder: distributable - distributed })
}

/// `distributable * stake / total_stake`, floored. Zero when nothing is staked.
pub fn share_of(distributable: U256, stake: U256, total_stake: U256) -> Result<U256, AccountingError> {
    if total_stake.is_zero() {
        return Ok(U256::ZERO);
    }
    let scaled = distributable.checked_mul(stake).ok_or(AccountingError::Overflow)?;
    Ok(scaled / total_stake)
}
