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
use network_rewards::{AccountingError, Operation};

use crate::{
    db::{EntityStore, StoreExt},
    entities::{era_id, pair_id, IndexerStake, IndexerStakeSummary, ALL_INDEXERS_ID},
    HandlerError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeDirection {
    Add,
    Remove,
}

impl StakeDirection {
    fn operation(self) -> Operation {
        match self {
            StakeDirection::Add => Operation::Add,
            StakeDirection::Remove => Operation::Sub,
        }
    }
}

/// Apply a stake change to the summary of `indexer` and to the all-indexers
/// summary, writing the matching `IndexerStake` snapshots.
///
/// Returns whether this is the first stake of the indexer, in which case the
/// change also took effect in the current era.
pub async fn apply_stake_delta(
    store: &dyn EntityStore,
    current_era: u64,
    indexer: &str,
    amount: U256,
    direction: StakeDirection,
    is_self_stake: bool,
) -> Result<bool, HandlerError> {
    let summary = load_summary(store, indexer, current_era).await?;
    let is_first_stake = direction == StakeDirection::Add && summary.total_stake.is_zero();

    let change = Change { amount, op: direction.operation(), is_self_stake, instant: is_first_stake };
    for summary in [summary, load_summary(store, ALL_INDEXERS_ID, current_era).await?] {
        let summary = change.apply(summary)?;
        if is_first_stake {
            store.save(&snapshot(&summary, current_era, false)).await?;
        }
        store.save(&snapshot(&summary, current_era + 1, true)).await?;
        store.save(&summary).await?;
    }

    tracing::debug!(
        "Stake of {indexer} {direction:?} {amount} (self: {is_self_stake}, first: {is_first_stake})"
    );
    Ok(is_first_stake)
}

struct Change {
    amount: U256,
    op: Operation,
    is_self_stake: bool,
    instant: bool,
}

impl Change {
    fn apply(&self, mut summary: IndexerStakeSummary) -> Result<IndexerStakeSummary, AccountingError> {
        summary.next_total_stake = self.op.apply(summary.next_total_stake, self.amount)?;
        if self.is_self_stake {
            summary.next_indexer_stake = self.op.apply(summary.next_indexer_stake, self.amount)?;
        } else {
            summary.next_delegator_stake =
                self.op.apply(summary.next_delegator_stake, self.amount)?;
        }

        if self.instant {
            summary.total_stake = self.op.apply(summary.total_stake, self.amount)?;
            if self.is_self_stake {
                summary.indexer_stake = self.op.apply(summary.indexer_stake, self.amount)?;
            } else {
                summary.delegator_stake = self.op.apply(summary.delegator_stake, self.amount)?;
            }
        }
        Ok(summary)
    }
}

/// Summary of `id` rolled forward to `current_era`.
async fn load_summary(
    store: &dyn EntityStore,
    id: &str,
    current_era: u64,
) -> Result<IndexerStakeSummary, HandlerError> {
    let Some(mut summary) = store.get::<IndexerStakeSummary>(id).await? else {
        return Ok(IndexerStakeSummary {
            id: id.to_string(),
            era_id: era_id(current_era),
            era_idx: current_era,
            total_stake: U256::ZERO,
            indexer_stake: U256::ZERO,
            delegator_stake: U256::ZERO,
            next_total_stake: U256::ZERO,
            next_indexer_stake: U256::ZERO,
            next_delegator_stake: U256::ZERO,
        });
    };

    if summary.era_idx > current_era {
        return Err(HandlerError::OutOfOrderEra {
            entity: "IndexerStakeSummary",
            id: id.to_string(),
            stored: summary.era_idx,
            target: current_era,
        });
    }
    if summary.era_idx < current_era {
        summary.total_stake = summary.next_total_stake;
        summary.indexer_stake = summary.next_indexer_stake;
        summary.delegator_stake = summary.next_delegator_stake;
        summary.era_id = era_id(current_era);
        summary.era_idx = current_era;
    }
    Ok(summary)
}

fn snapshot(summary: &IndexerStakeSummary, era: u64, next: bool) -> IndexerStake {
    let (total_stake, indexer_stake, delegator_stake) = if next {
        (summary.next_total_stake, summary.next_indexer_stake, summary.next_delegator_stake)
    } else {
        (summary.total_stake, summary.indexer_stake, summary.delegator_stake)
    };
    IndexerStake {
        id: pair_id(&summary.id, &era_id(era)),
        indexer_id: summary.id.clone(),
        era_id: era_id(era),
        era_idx: era,
        total_stake,
        indexer_stake,
        delegator_stake,
    }
}
