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

use alloy::primitives::U256;
use network_rewards::{AccountingError, EraValue};

use crate::entities::Indexer;

/// Recompute the derived `capacity` and `maxUnstakeAmount` of `indexer` for
/// both sides of its era values.
///
/// Capacity is `selfStake * leverageLimit - totalStake` and the unstake limit
/// is `selfStake - minimumStakingAmount`, both floored at zero.
pub fn refresh_capacity(
    indexer: &mut Indexer,
    current_era: u64,
    leverage_limit: U256,
    minimum_staking_amount: U256,
) -> Result<(), AccountingError> {
    let self_now = indexer.self_stake.effective_at(current_era);
    let total_now = indexer.total_stake.effective_at(current_era);
    let self_after = indexer.self_stake.value_after;
    let total_after = indexer.total_stake.value_after;

    let capacity = |self_stake: U256, total: U256| {
        self_stake
            .checked_mul(leverage_limit)
            .map(|limit| limit.saturating_sub(total))
            .ok_or(AccountingError::Overflow)
    };

    let era = i64::try_from(current_era).map_err(|_| AccountingError::Overflow)?;
    indexer.capacity = EraValue {
        era,
        value: capacity(self_now, total_now)?,
        value_after: capacity(self_after, total_after)?,
    };
    indexer.max_unstake_amount = EraValue {
        era,
        value: self_now.saturating_sub(minimum_staking_amount),
        value_after: self_after.saturating_sub(minimum_staking_amount),
    };
    Ok(())
}
