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
use network_rewards::{EraValue, Operation};

use super::{EventContext, Handlers};
use crate::{
    contracts::{IIndexerRegistry, IStaking},
    db::StoreExt,
    entities::{
        address_id, bytes_id, pair_id, CacheKey, Delegation, Delegator, Indexer, IndexerStatus,
        PendingExits,
    },
    ledger::{
        add_to_era_delegation, apply_stake_delta, refresh_capacity, remove_from_era_delegation,
        update_era_stake, StakeDirection,
    },
    HandlerError,
};

/// Chain-derived values a stake change depends on. Resolved before the first
/// write so a failed contract read leaves nothing half applied.
struct StakeConstants {
    era: u64,
    leverage_limit: U256,
    minimum_staking_amount: U256,
}

impl Handlers {
    pub async fn handle_register_indexer(
        &self,
        ctx: &EventContext<IIndexerRegistry::RegisterIndexer>,
    ) -> Result<(), HandlerError> {
        let id = address_id(ctx.args.indexer);
        let metadata = bytes_id(ctx.args.metadata);
        tracing::debug!("Registering indexer {id} at block {}", ctx.block_number);

        let indexer = match self.store.get::<Indexer>(&id).await? {
            Some(mut indexer) => {
                if indexer.status == IndexerStatus::Unregistered {
                    indexer.status = indexer.status.transition(IndexerStatus::Active)?;
                }
                indexer.metadata = metadata;
                indexer.last_event = ctx.event_id();
                indexer
            }
            None => Indexer::new(id, metadata, ctx.block_number, ctx.event_id()),
        };
        self.store.save(&indexer).await?;
        Ok(())
    }

    pub async fn handle_unregister_indexer(
        &self,
        ctx: &EventContext<IIndexerRegistry::UnregisterIndexer>,
    ) -> Result<(), HandlerError> {
        let id = address_id(ctx.args.indexer);
        let mut indexer = self.require_indexer("handle_unregister_indexer", ctx, &id).await?;
        indexer.status = indexer.status.transition(IndexerStatus::Unregistered)?;
        indexer.last_event = ctx.event_id();
        self.store.save(&indexer).await?;
        tracing::debug!("Unregistered indexer {id}");
        Ok(())
    }

    /// The first rate an indexer sets applies at once, later ones from the
    /// next era.
    pub async fn handle_set_commission_rate(
        &self,
        ctx: &EventContext<IIndexerRegistry::SetCommissionRate>,
    ) -> Result<(), HandlerError> {
        let id = address_id(ctx.args.indexer);
        let mut indexer = self.require_indexer("handle_set_commission_rate", ctx, &id).await?;
        let era = self.eras.current_era().await?;

        let instant = indexer.commission.era == network_rewards::UNSET_ERA;
        indexer.commission = EraValue::merge(
            Some(&indexer.commission),
            ctx.args.amount,
            Operation::Replace,
            instant,
            era,
        )?;
        indexer.last_event = ctx.event_id();
        self.store.save(&indexer).await?;
        tracing::debug!("Commission of {id} set to {} (instant: {instant})", ctx.args.amount);
        Ok(())
    }

    pub async fn handle_set_indexer_leverage_limit(
        &self,
        ctx: &EventContext<IStaking::SetIndexerLeverageLimit>,
    ) -> Result<(), HandlerError> {
        tracing::info!("Indexer leverage limit updated to {}", ctx.args.amount);
        self.eras.set_constant(CacheKey::IndexerLeverageLimit, ctx.args.amount).await
    }

    pub async fn handle_set_minimum_staking_amount(
        &self,
        ctx: &EventContext<IIndexerRegistry::SetMinimumStakingAmount>,
    ) -> Result<(), HandlerError> {
        tracing::info!("Minimum staking amount updated to {}", ctx.args.amount);
        self.eras.set_constant(CacheKey::MinimumStakingAmount, ctx.args.amount).await
    }

    /// A delegation to an indexer with no stake in the current era applies at
    /// once; otherwise it takes effect from the next era.
    pub async fn handle_delegation_added(
        &self,
        ctx: &EventContext<IStaking::DelegationAdded>,
    ) -> Result<(), HandlerError> {
        let store = self.store.as_ref();
        let delegator_id = address_id(ctx.args.source);
        let indexer_id = address_id(ctx.args.runner);
        let amount = ctx.args.amount;
        let is_self_stake = ctx.args.source == ctx.args.runner;
        let constants = self.stake_constants().await?;
        let era = constants.era;

        // The self stake of a new indexer is emitted before its registration.
        let mut indexer = match store.get::<Indexer>(&indexer_id).await? {
            Some(indexer) => indexer,
            None if is_self_stake => {
                Indexer::new(indexer_id.clone(), String::new(), ctx.block_number, ctx.event_id())
            }
            None => {
                return self
                    .require_indexer("handle_delegation_added", ctx, &indexer_id)
                    .await
                    .map(|_| ())
            }
        };

        let instant = apply_stake_delta(
            store,
            era,
            &indexer_id,
            amount,
            StakeDirection::Add,
            is_self_stake,
        )
        .await?;
        let target_era = if instant { era } else { era + 1 };

        let delegation_id = pair_id(&delegator_id, &indexer_id);
        let mut delegation = match store.get::<Delegation>(&delegation_id).await? {
            Some(delegation) => delegation,
            None => Delegation {
                id: delegation_id,
                delegator_id: delegator_id.clone(),
                indexer_id: indexer_id.clone(),
                amount: EraValue::unset(),
                exit_era: None,
                created_block: ctx.block_number,
                last_event: ctx.event_id(),
            },
        };
        delegation.amount =
            EraValue::merge(Some(&delegation.amount), amount, Operation::Add, instant, era)?;
        delegation.exit_era = None;
        delegation.last_event = ctx.event_id();
        store.save(&delegation).await?;

        let mut delegator = match store.get::<Delegator>(&delegator_id).await? {
            Some(delegator) => delegator,
            None => Delegator {
                id: delegator_id.clone(),
                total_delegations: EraValue::unset(),
                start_era: target_era,
                exit_era: None,
                created_block: ctx.block_number,
                last_event: ctx.event_id(),
            },
        };
        delegator.total_delegations = EraValue::merge(
            Some(&delegator.total_delegations),
            amount,
            Operation::Add,
            instant,
            era,
        )?;
        delegator.exit_era = None;
        delegator.last_event = ctx.event_id();
        store.save(&delegator).await?;

        indexer.total_stake =
            EraValue::merge(Some(&indexer.total_stake), amount, Operation::Add, instant, era)?;
        if is_self_stake {
            indexer.self_stake =
                EraValue::merge(Some(&indexer.self_stake), amount, Operation::Add, instant, era)?;
        }
        constants.refresh_capacity(&mut indexer)?;
        indexer.last_event = ctx.event_id();
        store.save(&indexer).await?;

        update_era_stake(store, &indexer_id, &delegator_id, target_era, amount, Operation::Add)
            .await?;
        add_to_era_delegation(store, target_era, &indexer_id, &delegator_id, amount).await?;

        tracing::debug!(
            "Delegation {delegator_id} -> {indexer_id} +{amount} effective from era {target_era}"
        );
        Ok(())
    }

    /// Removed stake always leaves at the end of the current era.
    pub async fn handle_delegation_removed(
        &self,
        ctx: &EventContext<IStaking::DelegationRemoved>,
    ) -> Result<(), HandlerError> {
        let store = self.store.as_ref();
        let delegator_id = address_id(ctx.args.source);
        let indexer_id = address_id(ctx.args.runner);
        let amount = ctx.args.amount;
        let is_self_stake = ctx.args.source == ctx.args.runner;
        let constants = self.stake_constants().await?;
        let era = constants.era;

        let mut indexer =
            self.require_indexer("handle_delegation_removed", ctx, &indexer_id).await?;
        let delegation_id = pair_id(&delegator_id, &indexer_id);
        let mut delegation = store
            .get::<Delegation>(&delegation_id)
            .await?
            .ok_or(HandlerError::MissingEntity { entity: "Delegation", id: delegation_id })?;
        let mut delegator = store.get::<Delegator>(&delegator_id).await?.ok_or_else(|| {
            HandlerError::MissingEntity { entity: "Delegator", id: delegator_id.clone() }
        })?;

        let exit_era = era + 1;
        apply_stake_delta(store, era, &indexer_id, amount, StakeDirection::Remove, is_self_stake)
            .await?;

        delegation.amount =
            EraValue::merge(Some(&delegation.amount), amount, Operation::Sub, false, era)?;
        if delegation.amount.value_after.is_zero() {
            delegation.exit_era = Some(exit_era);
        }
        delegation.last_event = ctx.event_id();
        store.save(&delegation).await?;

        if delegation.exit_era.is_some() {
            let mut pending = store
                .get::<PendingExits>(&indexer_id)
                .await?
                .unwrap_or_else(|| PendingExits {
                    id: indexer_id.clone(),
                    delegators: Vec::new(),
                });
            if !pending.delegators.contains(&delegator_id) {
                pending.delegators.push(delegator_id.clone());
                store.save(&pending).await?;
            }
        }

        delegator.total_delegations = EraValue::merge(
            Some(&delegator.total_delegations),
            amount,
            Operation::Sub,
            false,
            era,
        )?;
        if delegator.total_delegations.value_after.is_zero() {
            delegator.exit_era = Some(exit_era);
        }
        delegator.last_event = ctx.event_id();
        store.save(&delegator).await?;

        indexer.total_stake =
            EraValue::merge(Some(&indexer.total_stake), amount, Operation::Sub, false, era)?;
        if is_self_stake {
            indexer.self_stake =
                EraValue::merge(Some(&indexer.self_stake), amount, Operation::Sub, false, era)?;
        }
        constants.refresh_capacity(&mut indexer)?;
        indexer.last_event = ctx.event_id();
        store.save(&indexer).await?;

        update_era_stake(store, &indexer_id, &delegator_id, exit_era, amount, Operation::Sub)
            .await?;
        remove_from_era_delegation(store, exit_era, &indexer_id, &delegator_id, amount).await?;

        tracing::debug!(
            "Delegation {delegator_id} -> {indexer_id} -{amount} effective from era {exit_era}"
        );
        Ok(())
    }

    async fn stake_constants(&self) -> Result<StakeConstants, HandlerError> {
        Ok(StakeConstants {
            era: self.eras.current_era().await?,
            leverage_limit: self.eras.indexer_leverage_limit().await?,
            minimum_staking_amount: self.eras.minimum_staking_amount().await?,
        })
    }
}

impl StakeConstants {
    fn refresh_capacity(&self, indexer: &mut Indexer) -> Result<(), HandlerError> {
        refresh_capacity(indexer, self.era, self.leverage_limit, self.minimum_staking_amount)?;
        Ok(())
    }
}
