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

/// One booster change, keyed `{deployment}:{account}:{txHash}:{logIndex}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentBooster {
    pub id: String,
    pub deployment_id: String,
    pub consumer: String,
    #[serde(with = "json_bigint")]
    pub amount_added: U256,
    #[serde(with = "json_bigint")]
    pub amount_removed: U256,
    pub era_idx: u64,
    pub created_block: u64,
    pub create_at: u64,
}

/// Running booster totals of one consumer on one deployment, keyed
/// `{deployment}:{account}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentBoosterSummary {
    pub id: String,
    pub deployment_id: String,
    pub consumer: String,
    #[serde(with = "json_bigint")]
    pub total_added: U256,
    #[serde(with = "json_bigint")]
    pub total_removed: U256,
    #[serde(with = "json_bigint")]
    pub total_amount: U256,
    pub update_at: u64,
}

/// Allocation rewards of one indexer on one deployment during one era, keyed
/// `{deployment}:{indexer}:{eraId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerAllocationReward {
    pub id: String,
    pub deployment_id: String,
    pub indexer_id: String,
    pub era_idx: u64,
    #[serde(with = "json_bigint")]
    pub reward: U256,
    pub update_at: u64,
}

/// All-time allocation rewards of one indexer on one deployment, keyed
/// `{deployment}:{indexer}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerAllocationRewardSummary {
    pub id: String,
    pub deployment_id: String,
    pub indexer_id: String,
    #[serde(with = "json_bigint")]
    pub total_reward: U256,
    pub update_at: u64,
}

/// Rewards of one deployment during one era, keyed `{deployment}:{eraId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraDeploymentRewards {
    pub id: String,
    pub deployment_id: String,
    pub era_idx: u64,
    #[serde(with = "json_bigint")]
    pub allocation_rewards: U256,
    #[serde(with = "json_bigint")]
    pub query_rewards: U256,
    #[serde(with = "json_bigint")]
    pub total_rewards: U256,
}

impl EraDeploymentRewards {
    pub fn empty(id: String, deployment_id: String, era_idx: u64) -> Self {
        Self {
            id,
            deployment_id,
            era_idx,
            allocation_rewards: U256::ZERO,
            query_rewards: U256::ZERO,
            total_rewards: U256::ZERO,
        }
    }
}

impl_entity!(
    DeploymentBooster => "DeploymentBooster",
    DeploymentBoosterSummary => "DeploymentBoosterSummary",
    IndexerAllocationReward => "IndexerAllocationReward",
    IndexerAllocationRewardSummary => "IndexerAllocationRewardSummary",
    EraDeploymentRewards => "EraDeploymentRewards",
);
