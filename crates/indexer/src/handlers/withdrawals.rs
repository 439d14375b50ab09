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

use alloy::primitives::{Address, U256};

use super::{EventContext, Handlers};
use crate::{
    chain::u256_to_u64,
    contracts::IStaking,
    db::StoreExt,
    entities::{address_id, pair_id, Withdrawal, WithdrawalStatus, WithdrawalType},
    HandlerError,
};

fn withdrawal_id(source: Address, index: U256) -> String {
    pair_id(&address_id(source), &format!("{index:#x}"))
}

impl Handlers {
    pub async fn handle_unbond_requested(
        &self,
        ctx: &EventContext<IStaking::UnbondRequested>,
    ) -> Result<(), HandlerError> {
        let args = &ctx.args;
        let kind = WithdrawalType::try_from(args.unbondType).map_err(|value| {
            HandlerError::UnknownEnumValue { kind: "unbond type", value: u64::from(value) }
        })?;

        let withdrawal = Withdrawal {
            id: withdrawal_id(args.source, args.index),
            delegator: address_id(args.source),
            indexer: address_id(args.runner),
            index: u256_to_u64("unbond index", args.index)?,
            amount: args.amount,
            kind,
            status: WithdrawalStatus::Ongoing,
            created_block: ctx.block_number,
            last_event: ctx.event_id(),
        };
        tracing::debug!("Withdrawal {} requested ({kind:?}, {})", withdrawal.id, args.amount);
        self.store.save(&withdrawal).await?;
        Ok(())
    }

    /// A claim can be delivered before the request it settles; that case is
    /// recorded and skipped.
    pub async fn handle_unbond_withdrawn(
        &self,
        ctx: &EventContext<IStaking::UnbondWithdrawn>,
    ) -> Result<(), HandlerError> {
        let id = withdrawal_id(ctx.args.source, ctx.args.index);
        let Some(mut withdrawal) = self.store.get::<Withdrawal>(&id).await? else {
            let err = HandlerError::MissingEntity { entity: "Withdrawal", id };
            tracing::warn!("handle_unbond_withdrawn: {err}, skipping");
            self.record_exception("handle_unbond_withdrawn", ctx, &err).await?;
            return Ok(());
        };

        withdrawal.status = withdrawal.status.transition(WithdrawalStatus::Claimed)?;
        withdrawal.last_event = ctx.event_id();
        self.store.save(&withdrawal).await?;
        Ok(())
    }

    pub async fn handle_unbond_cancelled(
        &self,
        ctx: &EventContext<IStaking::UnbondCancelled>,
    ) -> Result<(), HandlerError> {
        let id = withdrawal_id(ctx.args.source, ctx.args.index);
        let mut withdrawal = self
            .store
            .get::<Withdrawal>(&id)
            .await?
            .ok_or(HandlerError::MissingEntity { entity: "Withdrawal", id })?;

        withdrawal.status = withdrawal.status.transition(WithdrawalStatus::Cancelled)?;
        withdrawal.last_event = ctx.event_id();
        self.store.save(&withdrawal).await?;
        Ok(())
    }
}
