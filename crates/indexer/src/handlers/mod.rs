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

//! Event handlers. Each handler reads the entities it needs, applies one
//! decoded event and persists the result before returning.
//!
//! Handlers are not idempotent: the caller must deliver every log exactly
//! once and in chain order.

mod booster;
mod era_manager;
mod rewards;
mod staking;
mod withdrawals;

use std::sync::Arc;

use alloy::{primitives::B256, rpc::types::Log, sol_types::SolEvent};

use crate::{
    chain::ChainObj,
    contracts::{IEraManager, IIndexerRegistry, IRewardsBooster, IRewardsDistributor, IStaking},
    db::{StoreExt, StoreObj},
    entities::{bytes_id, Exception, Indexer},
    era::EraDirectory,
    HandlerError,
};

/// A decoded event together with the position of the log that carried it.
#[derive(Debug, Clone)]
pub struct EventContext<E> {
    pub args: E,
    pub block_number: u64,
    pub block_hash: B256,
    pub tx_hash: B256,
    pub log_index: u64,
    pub block_timestamp: u64,
}

impl<E> EventContext<E> {
    /// `{txHash}:{logIndex}`, stored as the last event that touched an entity.
    pub fn event_id(&self) -> String {
        format!("{}:{}", bytes_id(self.tx_hash), self.log_index)
    }
}

impl<E: SolEvent> EventContext<E> {
    pub fn from_log(log: &Log, block_timestamp: u64) -> Result<Self, HandlerError> {
        let decoded = log.log_decode::<E>()?;
        Ok(Self {
            args: decoded.inner.data,
            block_number: log.block_number.ok_or(HandlerError::IncompleteLog("block number"))?,
            block_hash: log.block_hash.ok_or(HandlerError::IncompleteLog("block hash"))?,
            tx_hash: log.transaction_hash.ok_or(HandlerError::IncompleteLog("transaction hash"))?,
            log_index: log.log_index.ok_or(HandlerError::IncompleteLog("log index"))?,
            block_timestamp,
        })
    }
}

#[derive(Clone)]
pub struct Handlers {
    store: StoreObj,
    eras: Arc<EraDirectory>,
}

macro_rules! route {
    ($self:ident, $log:ident, $timestamp:ident, $topic:ident; $($event:ty => $handler:ident),* $(,)?) => {
        $(
            if $topic == <$event as SolEvent>::SIGNATURE_HASH {
                let ctx = EventContext::<$event>::from_log($log, $timestamp)?;
                return $self.$handler(&ctx).await;
            }
        )*
    };
}

impl Handlers {
    pub fn new(store: StoreObj, chain: ChainObj) -> Self {
        let eras = Arc::new(EraDirectory::new(store.clone(), chain));
        Self { store, eras }
    }

    pub fn store(&self) -> &StoreObj {
        &self.store
    }

    pub fn eras(&self) -> &EraDirectory {
        &self.eras
    }

    /// Route a raw log to the handler of its event. Logs of unknown events
    /// are ignored.
    pub async fn dispatch(&self, log: &Log, block_timestamp: u64) -> Result<(), HandlerError> {
        let Some(&topic) = log.topic0() else {
            return Ok(());
        };

        route!(self, log, block_timestamp, topic;
            IEraManager::NewEraStart => handle_new_era,
            IEraManager::EraPeriodUpdate => handle_era_period_update,
            IIndexerRegistry::RegisterIndexer => handle_register_indexer,
            IIndexerRegistry::UnregisterIndexer => handle_unregister_indexer,
            IIndexerRegistry::SetCommissionRate => handle_set_commission_rate,
            IIndexerRegistry::SetMinimumStakingAmount => handle_set_minimum_staking_amount,
            IStaking::SetIndexerLeverageLimit => handle_set_indexer_leverage_limit,
            IStaking::DelegationAdded => handle_delegation_added,
            IStaking::DelegationRemoved => handle_delegation_removed,
            IStaking::UnbondRequested => handle_unbond_requested,
            IStaking::UnbondWithdrawn => handle_unbond_withdrawn,
            IStaking::UnbondCancelled => handle_unbond_cancelled,
            IRewardsDistributor::DistributeRewards => handle_distribute_rewards,
            IRewardsDistributor::ClaimRewards => handle_claim_rewards,
            IRewardsBooster::DeploymentBoosterAdded => handle_booster_added,
            IRewardsBooster::DeploymentBoosterRemoved => handle_booster_removed,
            IRewardsBooster::AllocationRewardsGiven => handle_allocation_rewards_given,
            IRewardsBooster::QueryRewardsSpent => handle_query_rewards_spent,
        );

        tracing::trace!("Ignoring log with topic {topic}");
        Ok(())
    }

    /// Persist an audit record of `error` keyed by the block and transaction
    /// of `ctx`.
    async fn record_exception<E: Sync>(
        &self,
        handler: &str,
        ctx: &EventContext<E>,
        error: &HandlerError,
    ) -> Result<(), HandlerError> {
        let exception = Exception {
            id: Exception::key(ctx.block_number, ctx.tx_hash),
            handler: handler.to_string(),
            error: error.to_string(),
            block_number: ctx.block_number,
            tx_hash: bytes_id(ctx.tx_hash),
        };
        self.store.save(&exception).await?;
        Ok(())
    }

    /// Load a registered indexer; a missing one is recorded as an exception
    /// before the error is raised.
    async fn require_indexer<E: Sync>(
        &self,
        handler: &str,
        ctx: &EventContext<E>,
        id: &str,
    ) -> Result<Indexer, HandlerError> {
        if let Some(indexer) = self.store.get::<Indexer>(id).await? {
            return Ok(indexer);
        }
        let err = HandlerError::IndexerNotFound(id.to_string());
        tracing::error!("{handler}: {err}");
        self.record_exception(handler, ctx, &err).await?;
        Err(err)
    }
}
