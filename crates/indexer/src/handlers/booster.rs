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

use alloy::primitives::{Address, B256, U256};
use network_rewards::Operation;

use super::{EventContext, Handlers};
use crate::{
    contracts::IRewardsBooster,
    db::StoreExt,
    entities::{
        address_id, bytes_id, era_id, pair_id, DeploymentBooster, DeploymentBoosterSummary,
        EraDeploymentRewards, IndexerAllocationReward, IndexerAllocationRewardSummary,
    },
    HandlerError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RewardKind {
    Allocation,
    Query,
}

impl Handlers {
    pub async fn handle_booster_added(
        &self,
        ctx: &EventContext<IRewardsBooster::DeploymentBoosterAdded>,
    ) -> Result<(), HandlerError> {
        let args = &ctx.args;
        self.record_booster(ctx, args.deploymentId, args.account, args.amount, Operation::Add)
            .await
    }

    pub async fn handle_booster_removed(
        &self,
        ctx: &EventContext<IRewardsBooster::DeploymentBoosterRemoved>,
    ) -> Result<(), HandlerError> {
        let args = &ctx.args;
        self.record_booster(ctx, args.deploymentId, args.account, args.amount, Operation::Sub)
            .await
    }

    async fn record_booster<E: Sync>(
        &self,
        ctx: &EventContext<E>,
        deployment: B256,
        account: Address,
        amount: U256,
        op: Operation,
    ) -> Result<(), HandlerError> {
        let store = self.store.as_ref();
        let deployment_id = bytes_id(deployment);
        let consumer = address_id(account);
        let era = self.eras.current_era().await?;
        let added = op == Operation::Add;

        let summary_id = pair_id(&deployment_id, &consumer);
        let mut summary = match store.get::<DeploymentBoosterSummary>(&summary_id).await? {
            Some(summary) => summary,
            None => DeploymentBoosterSummary {
                id: summary_id,
                deployment_id: deployment_id.clone(),
                consumer: consumer.clone(),
                total_added: U256::ZERO,
                total_removed: U256::ZERO,
                total_amount: U256::ZERO,
                update_at: ctx.block_timestamp,
            },
        };
        if added {
            summary.total_added = Operation::Add.apply(summary.total_added, amount)?;
        } else {
            summary.total_removed = Operation::Add.apply(summary.total_removed, amount)?;
        }
        summary.total_amount = op.apply(summary.total_amount, amount)?;
        summary.update_at = ctx.block_timestamp;
        store.save(&summary).await?;

        store
            .save(&DeploymentBooster {
                id: format!("{}:{}", summary.id, ctx.event_id()),
                deployment_id,
                consumer,
                amount_added: if added { amount } else { U256::ZERO },
                amount_removed: if added { U256::ZERO } else { amount },
                era_idx: era,
                created_block: ctx.block_number,
                create_at: ctx.block_timestamp,
            })
            .await?;
        Ok(())
    }

    pub async fn handle_allocation_rewards_given(
        &self,
        ctx: &EventContext<IRewardsBooster::AllocationRewardsGiven>,
    ) -> Result<(), HandlerError> {
        let store = self.store.as_ref();
        let deployment_id = bytes_id(ctx.args.deploymentId);
        let indexer_id = address_id(ctx.args.runner);
        let amount = ctx.args.amount;
        let era = self.eras.current_era().await?;

        let reward_id = pair_id(&pair_id(&deployment_id, &indexer_id), &era_id(era));
        let mut reward = match store.get::<IndexerAllocationReward>(&reward_id).await? {
            Some(reward) => reward,
            None => IndexerAllocationReward {
                id: reward_id,
                deployment_id: deployment_id.clone(),
                indexer_id: indexer_id.clone(),
                era_idx: era,
                reward: U256::ZERO,
                update_at: ctx.block_timestamp,
            },
        };
        reward.reward = Operation::Add.apply(reward.reward, amount)?;
        reward.update_at = ctx.block_timestamp;
        store.save(&reward).await?;

        let summary_id = pair_id(&deployment_id, &indexer_id);
        let mut summary = match store.get::<IndexerAllocationRewardSummary>(&summary_id).await? {
            Some(summary) => summary,
            None => IndexerAllocationRewardSummary {
                id: summary_id,
                deployment_id: deployment_id.clone(),
                indexer_id,
                total_reward: U256::ZERO,
                update_at: ctx.block_timestamp,
            },
        };
        summary.total_reward = Operation::Add.apply(summary.total_reward, amount)?;
        summary.update_at = ctx.block_timestamp;
        store.save(&summary).await?;

        self.add_deployment_rewards(&deployment_id, era, amount, RewardKind::Allocation).await
    }

    pub async fn handle_query_rewards_spent(
        &self,
        ctx: &EventContext<IRewardsBooster::QueryRewardsSpent>,
    ) -> Result<(), HandlerError> {
        let deployment_id = bytes_id(ctx.args.deploymentId);
        let era = self.eras.current_era().await?;
        self.add_deployment_rewards(&deployment_id, era, ctx.args.amount, RewardKind::Query).await
    }

    async fn add_deployment_rewards(
        &self,
        deployment_id: &str,
        era: u64,
        amount: U256,
        kind: RewardKind,
    ) -> Result<(), HandlerError> {
        let id = pair_id(deployment_id, &era_id(era));
        let mut rewards = match self.store.get::<EraDeploymentRewards>(&id).await? {
            Some(rewards) => rewards,
            None => EraDeploymentRewards::empty(id, deployment_id.to_string(), era),
        };
        match kind {
            RewardKind::Allocation => {
                rewards.allocation_rewards = Operation::Add.apply(rewards.allocation_rewards, amount)?
            }
            RewardKind::Query => {
                rewards.query_rewards = Operation::Add.apply(rewards.query_rewards, amount)?
            }
        }
        rewards.total_rewards = Operation::Add.apply(rewards.total_rewards, amount)?;
        self.store.save(&rewards).await?;
        Ok(())
    }
}
