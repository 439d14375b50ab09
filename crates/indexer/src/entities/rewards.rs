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
use network_rewards::codec::json_bigint;
use serde::{Deserialize, Serialize};

/// Rewards earned but not yet claimed, keyed `{indexer}:{delegator}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnclaimedReward {
    pub id: String,
    pub indexer_id: String,
    pub delegator_id: String,
    #[serde(with = "json_bigint")]
    pub amount: U256,
    pub created_block: u64,
    pub last_event: String,
}

/// A claim transaction, keyed `{indexer}:{delegator}:{txHash}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub indexer_id: String,
    pub delegator_id: String,
    #[serde(with = "json_bigint")]
    pub amount: U256,
    pub claimed_time: u64,
    pub created_block: u64,
}

/// Reward attributed to one delegator for one era, keyed
/// `{indexer}:{delegator}:{eraId}` with a `:commission` suffix for the
/// indexer's commission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraReward {
    pub id: String,
    pub indexer_id: String,
    pub delegator_id: String,
    pub era_id: String,
    pub era_idx: u64,
    #[serde(with = "json_bigint")]
    pub amount: U256,
    pub is_indexer: bool,
    pub is_commission: bool,
    pub claimed: bool,
    pub created_block: u64,
    pub create_at: u64,
}

impl EraReward {
    pub fn key(indexer: &str, delegator: &str, era: u64, is_commission: bool) -> String {
        let base = format!("{indexer}:{delegator}:{}", super::era_id(era));
        if is_commission {
            format!("{base}:commission")
        } else {
            base
        }
    }
}

/// Last era whose rewards a delegator claimed from an indexer, keyed
/// `{indexer}:{delegator}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraRewardClaimed {
    pub id: String,
    pub last_claimed_era: u64,
}

/// Totals of one distribution pass, keyed `{indexer}:{eraId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerReward {
    pub id: String,
    pub indexer_id: String,
    pub era_id: String,
    pub era_idx: u64,
    #[serde(with = "json_bigint")]
    pub amount: U256,
    #[serde(with = "json_bigint")]
    pub commission: U256,
    pub delegators: u64,
    pub created_block: u64,
}

impl_entity!(
    UnclaimedReward => "UnclaimedReward",
    Reward => "Reward",
    EraReward => "EraReward",
    EraRewardClaimed => "EraRewardClaimed",
    IndexerReward => "IndexerReward",
);
