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
use network_rewards::{codec::json_bigint, EraValue, StakeList};
use serde::{Deserialize, Serialize};

use super::IllegalTransition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexerStatus {
    Active,
    Unregistered,
}

impl IndexerStatus {
    pub fn transition(self, to: IndexerStatus) -> Result<IndexerStatus, IllegalTransition> {
        match (self, to) {
            (IndexerStatus::Active, IndexerStatus::Unregistered)
            | (IndexerStatus::Unregistered, IndexerStatus::Active) => Ok(to),
            _ => Err(IllegalTransition {
                entity: "Indexer",
                from: format!("{self:?}"),
                to: format!("{to:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indexer {
    pub id: String,
    pub status: IndexerStatus,
    pub metadata: String,
    pub commission: EraValue,
    pub total_stake: EraValue,
    pub self_stake: EraValue,
    pub capacity: EraValue,
    pub max_unstake_amount: EraValue,
    pub created_block: u64,
    pub last_event: String,
}

impl Indexer {
    pub fn new(id: String, metadata: String, created_block: u64, last_event: String) -> Self {
        Self {
            id,
            status: IndexerStatus::Active,
            metadata,
            commission: EraValue::unset(),
            total_stake: EraValue::unset(),
            self_stake: EraValue::unset(),
            capacity: EraValue::unset(),
            max_unstake_amount: EraValue::unset(),
            created_block,
            last_event,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegator {
    pub id: String,
    pub total_delegations: EraValue,
    pub start_era: u64,
    pub exit_era: Option<u64>,
    pub created_block: u64,
    pub last_event: String,
}

/// Stake of one delegator with one indexer, keyed `{delegator}:{indexer}`.
///
/// `exit_era` is set once the deferred amount reaches zero and cleared by any
/// later addition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    pub id: String,
    pub delegator_id: String,
    pub indexer_id: String,
    pub amount: EraValue,
    pub exit_era: Option<u64>,
    pub created_block: u64,
    pub last_event: String,
}

/// Delegators of an indexer whose delegation is scheduled to exit, keyed by
/// indexer id. Cleared by the distribution pass that deletes the delegation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingExits {
    pub id: String,
    pub delegators: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Ongoing,
    Claimed,
    Cancelled,
}

impl WithdrawalStatus {
    pub fn transition(self, to: WithdrawalStatus) -> Result<WithdrawalStatus, IllegalTransition> {
        match (self, to) {
            (WithdrawalStatus::Ongoing, WithdrawalStatus::Claimed)
            | (WithdrawalStatus::Ongoing, WithdrawalStatus::Cancelled) => Ok(to),
            _ => Err(IllegalTransition {
                entity: "Withdrawal",
                from: format!("{self:?}"),
                to: format!("{to:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalType {
    Undelegation,
    Unstake,
    Commission,
    Merge,
}

impl TryFrom<u8> for WithdrawalType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WithdrawalType::Undelegation),
            1 => Ok(WithdrawalType::Unstake),
            2 => Ok(WithdrawalType::Commission),
            3 => Ok(WithdrawalType::Merge),
            other => Err(other),
        }
    }
}

/// Unbonding request, keyed `{delegator}:{index}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: String,
    pub delegator: String,
    pub indexer: String,
    pub index: u64,
    #[serde(with = "json_bigint")]
    pub amount: U256,
    #[serde(rename = "type")]
    pub kind: WithdrawalType,
    pub status: WithdrawalStatus,
    pub created_block: u64,
    pub last_event: String,
}

/// Live stake totals of one indexer (or of every indexer, see
/// [super::ALL_INDEXERS_ID]) for the current and the next era.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStakeSummary {
    pub id: String,
    pub era_id: String,
    pub era_idx: u64,
    #[serde(with = "json_bigint")]
    pub total_stake: U256,
    #[serde(with = "json_bigint")]
    pub indexer_stake: U256,
    #[serde(with = "json_bigint")]
    pub delegator_stake: U256,
    #[serde(with = "json_bigint")]
    pub next_total_stake: U256,
    #[serde(with = "json_bigint")]
    pub next_indexer_stake: U256,
    #[serde(with = "json_bigint")]
    pub next_delegator_stake: U256,
}

/// Append-only stake snapshot, keyed `{indexer}:{eraId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStake {
    pub id: String,
    pub indexer_id: String,
    pub era_id: String,
    pub era_idx: u64,
    #[serde(with = "json_bigint")]
    pub total_stake: U256,
    #[serde(with = "json_bigint")]
    pub indexer_stake: U256,
    #[serde(with = "json_bigint")]
    pub delegator_stake: U256,
}

/// Absolute stake of one (indexer, delegator) pair during one era, keyed
/// `{indexer}:{delegator}:{eraId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraStake {
    pub id: String,
    pub indexer_id: String,
    pub delegator_id: String,
    pub era_id: String,
    pub era_idx: u64,
    #[serde(with = "json_bigint")]
    pub stake: U256,
}

/// Last era an [EraStake] row was written for a pair, keyed `{indexer}:{delegator}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraStakeUpdate {
    pub id: String,
    pub last_update_by_era: u64,
}

/// Delegators of one indexer. The live row is keyed by the indexer id,
/// snapshots by `{indexer}:{eraId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraIndexerDelegator {
    pub id: String,
    pub indexer_id: String,
    pub era_idx: u64,
    pub delegators: StakeList,
}

/// Indexers of one delegator. The live row is keyed by the delegator id,
/// snapshots by `{delegator}:{eraId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraDelegatorIndexer {
    pub id: String,
    pub delegator_id: String,
    pub era_idx: u64,
    pub indexers: StakeList,
}

impl_entity!(
    Indexer => "Indexer",
    Delegator => "Delegator",
    Delegation => "Delegation",
    PendingExits => "PendingExits",
    Withdrawal => "Withdrawal",
    IndexerStakeSummary => "IndexerStakeSummary",
    IndexerStake => "IndexerStake",
    EraStake => "EraStake",
    EraStakeUpdate => "EraStakeUpdate",
    EraIndexerDelegator => "EraIndexerDelegator",
    EraDelegatorIndexer => "EraDelegatorIndexer",
);
