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

use std::collections::BTreeSet;

use alloy::primitives::U256;
use network_rewards::{split_rewards, AccountingError, DelegatorShare};

use super::{EventContext, Handlers};
use crate::{
    chain::u256_to_u64,
    contracts::IRewardsDistributor,
    db::StoreExt,
    entities::{
        address_id, bytes_id, era_id, pair_id, Delegation, EraIndexerDelegator, EraReward,
        EraRewardClaimed, IndexerReward, PendingExits, Reward, UnclaimedReward,
    },
    ledger::FanOut,
    HandlerError,
};

/// Delegations to delete once an era's rewards are written, and what remains
/// pending for the indexer afterwards.
struct ExitPlan {
    exited: Vec<String>,
    pending: Option<PendingExits>,
}

impl Handlers {
    /// Split the rewards of one era between the delegators of an indexer in
    /// proportion to their stake in that era.
    pub async fn handle_distribute_rewards(
        &self,
        ctx: &EventContext<IRewardsDistributor::DistributeRewards>,
    ) -> Result<(), HandlerError> {
        let store = self.store.as_ref();
        let indexer_id = address_id(ctx.args.runner);
        let era = u256_to_u64("eraIdx", ctx.args.eraIdx)?;
        let total_rewards = ctx.args.rewards;
        let commission = ctx.args.commission;

        let Some(fan_out) = self.fan_out_at(&indexer_id, era).await? else {
            tracing::debug!("No delegations to {indexer_id} in era {era}, nothing to distribute");
            return Ok(());
        };
        if fan_out.era() > era {
            return Err(HandlerError::OutOfOrderEra {
                entity: "EraIndexerDelegator",
                id: fan_out.id,
                stored: fan_out.era_idx,
                target: era,
            });
        }

        let split = split_rewards(total_rewards, commission, fan_out.list())?;
        let exits = self.plan_exits(&indexer_id, era, &fan_out, &split.shares).await?;

        for share in &split.shares {
            let unclaimed_id = pair_id(&indexer_id, &share.delegator);
            let mut unclaimed = match store.get::<UnclaimedReward>(&unclaimed_id).await? {
                Some(unclaimed) => unclaimed,
                None => UnclaimedReward {
                    id: unclaimed_id,
                    indexer_id: indexer_id.clone(),
                    delegator_id: share.delegator.clone(),
                    amount: U256::ZERO,
                    created_block: ctx.block_number,
                    last_event: ctx.event_id(),
                },
            };
            unclaimed.amount = unclaimed
                .amount
                .checked_add(share.reward)
                .ok_or(AccountingError::Overflow)?;
            unclaimed.last_event = ctx.event_id();
            store.save(&unclaimed).await?;

            if !share.reward.is_zero() {
                store
                    .save(&EraReward {
                        id: EraReward::key(&indexer_id, &share.delegator, era, false),
                        indexer_id: indexer_id.clone(),
                        delegator_id: share.delegator.clone(),
                        era_id: era_id(era),
                        era_idx: era,
                        amount: share.reward,
                        is_indexer: share.delegator == indexer_id,
                        is_commission: false,
                        claimed: false,
                        created_block: ctx.block_number,
                        create_at: ctx.block_timestamp,
                    })
                    .await?;
            }
        }

        if !commission.is_zero() {
            store
                .save(&EraReward {
                    id: EraReward::key(&indexer_id, &indexer_id, era, true),
                    indexer_id: indexer_id.clone(),
                    delegator_id: indexer_id.clone(),
                    era_id: era_id(era),
                    era_idx: era,
                    amount: commission,
                    is_indexer: true,
                    is_commission: true,
                    claimed: true,
                    created_block: ctx.block_number,
                    create_at: ctx.block_timestamp,
                })
                .await?;
        }

        store
            .save(&IndexerReward {
                id: pair_id(&indexer_id, &era_id(era)),
                indexer_id: indexer_id.clone(),
                era_id: era_id(era),
                era_idx: era,
                amount: total_rewards,
                commission,
                delegators: split.shares.len() as u64,
                created_block: ctx.block_number,
            })
            .await?;

        self.settle_exits(exits).await?;

        tracing::debug!(
            "Distributed {total_rewards} (commission {commission}) of {indexer_id} in era {era} \
             to {} delegators, {} left undistributed",
            split.shares.len(),
            split.remainder
        );
        Ok(())
    }

    /// Delegation fan-out of `indexer` as of `era`: its snapshot for that era,
    /// or the live row when it has not moved past `era`.
    async fn fan_out_at(
        &self,
        indexer: &str,
        era: u64,
    ) -> Result<Option<EraIndexerDelegator>, HandlerError> {
        let snapshot_id = EraIndexerDelegator::snapshot_id(indexer, era);
        if let Some(snapshot) = self.store.get::<EraIndexerDelegator>(&snapshot_id).await? {
            return Ok(Some(snapshot));
        }
        Ok(self.store.get::<EraIndexerDelegator>(indexer).await?)
    }

    /// Find the delegations that fully exited by `era`.
    ///
    /// Candidates are the delegators of this era and the previous one, plus
    /// every exit still pending for the indexer so an exit era that was never
    /// distributed is caught by a later pass. An exited delegator is absent
    /// from the fan-out of its exit era so its share must be zero.
    async fn plan_exits(
        &self,
        indexer: &str,
        era: u64,
        fan_out: &EraIndexerDelegator,
        shares: &[DelegatorShare],
    ) -> Result<ExitPlan, HandlerError> {
        let mut candidates: BTreeSet<String> =
            fan_out.delegators.entries.iter().map(|e| e.id.clone()).collect();
        if era > 0 {
            let previous_id = EraIndexerDelegator::snapshot_id(indexer, era - 1);
            if let Some(previous) = self.store.get::<EraIndexerDelegator>(&previous_id).await? {
                candidates.extend(previous.delegators.entries.into_iter().map(|e| e.id));
            }
        }
        let pending = self.store.get::<PendingExits>(indexer).await?;
        if let Some(pending) = &pending {
            candidates.extend(pending.delegators.iter().cloned());
        }

        let mut exited = Vec::new();
        let mut waiting = Vec::new();
        for delegator in candidates {
            let delegation_id = pair_id(&delegator, indexer);
            let Some(delegation) = self.store.get::<Delegation>(&delegation_id).await? else {
                continue;
            };
            let Some(exit_era) =
                delegation.exit_era.filter(|_| delegation.amount.value_after.is_zero())
            else {
                continue;
            };
            if exit_era > era {
                waiting.push(delegator);
                continue;
            }

            let reward = shares
                .iter()
                .find(|share| share.delegator == delegator)
                .map_or(U256::ZERO, |share| share.reward);
            if !reward.is_zero() {
                return Err(HandlerError::ExitRewardNotZero {
                    indexer: indexer.to_string(),
                    delegator,
                    era,
                    reward,
                });
            }
            exited.push(delegation_id);
        }

        let pending = pending.map(|mut pending| {
            pending.delegators.retain(|delegator| waiting.contains(delegator));
            pending
        });
        Ok(ExitPlan { exited, pending })
    }

    async fn settle_exits(&self, plan: ExitPlan) -> Result<(), HandlerError> {
        for delegation_id in &plan.exited {
            self.store.remove::<Delegation>(delegation_id).await?;
            tracing::debug!("Delegation {delegation_id} exited");
        }
        if let Some(pending) = &plan.pending {
            self.store.save(pending).await?;
        }
        Ok(())
    }

    /// Zero the unclaimed balance and mark every era reward up to the
    /// previous era as claimed.
    pub async fn handle_claim_rewards(
        &self,
        ctx: &EventContext<IRewardsDistributor::ClaimRewards>,
    ) -> Result<(), HandlerError> {
        let store = self.store.as_ref();
        let indexer_id = address_id(ctx.args.runner);
        let delegator_id = address_id(ctx.args.delegator);
        let pair = pair_id(&indexer_id, &delegator_id);
        let era = self.eras.current_era().await?;

        let mut unclaimed = match store.get::<UnclaimedReward>(&pair).await? {
            Some(unclaimed) => unclaimed,
            None => UnclaimedReward {
                id: pair.clone(),
                indexer_id: indexer_id.clone(),
                delegator_id: delegator_id.clone(),
                amount: U256::ZERO,
                created_block: ctx.block_number,
                last_event: ctx.event_id(),
            },
        };
        unclaimed.amount = U256::ZERO;
        unclaimed.last_event = ctx.event_id();
        store.save(&unclaimed).await?;

        store
            .save(&Reward {
                id: pair_id(&pair, &bytes_id(ctx.tx_hash)),
                indexer_id: indexer_id.clone(),
                delegator_id: delegator_id.clone(),
                amount: ctx.args.rewards,
                claimed_time: ctx.block_timestamp,
                created_block: ctx.block_number,
            })
            .await?;

        let last_claimed_era =
            store.get::<EraRewardClaimed>(&pair).await?.map_or(0, |c| c.last_claimed_era);
        let mut flipped = 0;
        for claimed_era in last_claimed_era + 1..era {
            let id = EraReward::key(&indexer_id, &delegator_id, claimed_era, false);
            if let Some(mut reward) = store.get::<EraReward>(&id).await? {
                reward.claimed = true;
                store.save(&reward).await?;
                flipped += 1;
            }
        }
        if era > 0 {
            store
                .save(&EraRewardClaimed { id: pair.clone(), last_claimed_era: era - 1 })
                .await?;
        }

        tracing::debug!(
            "{delegator_id} claimed {} from {indexer_id}, {flipped} era rewards settled",
            ctx.args.rewards
        );
        Ok(())
    }
}
