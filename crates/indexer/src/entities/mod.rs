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

//! Persisted entities.
//!
//! Ids follow a small set of conventions: addresses are lowercase `0x` hex,
//! eras are `0x`-prefixed hex of the era index, and composite ids join their
//! parts with `:`.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! impl_entity {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl crate::db::Entity for $ty {
                const NAME: &'static str = $name;

                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

mod booster;
mod era;
mod rewards;
mod staking;

pub use booster::{
    DeploymentBooster, DeploymentBoosterSummary, EraDeploymentRewards, IndexerAllocationReward,
    IndexerAllocationRewardSummary,
};
pub use era::{Cache, CacheKey, Era};
pub use rewards::{EraReward, EraRewardClaimed, IndexerReward, Reward, UnclaimedReward};
pub use staking::{
    Delegation, Delegator, EraDelegatorIndexer, EraIndexerDelegator, EraStake, EraStakeUpdate,
    Indexer, IndexerStake, IndexerStakeSummary, IndexerStatus, PendingExits, Withdrawal,
    WithdrawalStatus, WithdrawalType,
};

/// Id of the synthetic summary row that aggregates every indexer.
pub const ALL_INDEXERS_ID: &str = "0x00";


pub fn era_id(era: u64) -> String {
    format!("0x{era:x}")
}

pub fn address_id(address: Address) -> String {
    format!("{address:#x}")
}

pub fn bytes_id(bytes: B256) -> String {
    format!("{bytes:#x}")
}

pub fn pair_id(first: &str, second: &str) -> String {
    format!("{first}:{second}")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("illegal {entity} transition from {from} to {to}")]
pub struct IllegalTransition {
    pub entity: &'static str,
    pub from: String,
    pub to: String,
}

/// Audit record for a handler failure, keyed `{blockNumber}:{transactionHash}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exception {
    pub id: String,
    pub handler: String,
    pub error: String,
    pub block_number: u64,
    pub tx_hash: String,
}

impl Exception {
    pub fn key(block_number: u64, tx_hash: B256) -> String {
        format!("{block_number}:{}", bytes_id(tx_hash))
    }
}

impl_entity!(Exception => "Exception");
