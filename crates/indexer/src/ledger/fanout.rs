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
use network_rewards::StakeList;

use crate::{
    db::{Entity, EntityStore, StoreExt},
    entities::{era_id, pair_id, EraDelegatorIndexer, EraIndexerDelegator},
    HandlerError,
};

/// A live counterparty list keyed by its owner, snapshotted once per era
/// under `{owner}:{eraId}`.
pub trait FanOut: Entity + Clone {
    fn new(owner: &str, era: u64) -> Self;

    fn era(&self) -> u64;

    fn set_era(&mut self, era: u64);

    fn list(&self) -> &StakeList;

    fn list_mut(&mut self) -> &mut StakeList;

    /// Copy of this row stored under the snapshot key of `era`.
    fn at_era(&self, owner: &str, era: u64) -> Self;

    fn snapshot_id(owner: &str, era: u64) -> String {
        pair_id(owner, &era_id(era))
    }
}

impl FanOut for EraIndexerDelegator {
    fn new(owner: &str, era: u64) -> Self {
        Self {
            id: owner.to_string(),
            indexer_id: owner.to_string(),
            era_idx: era,
            delegators: StakeList::default(),
        }
    }

    fn era(&self) -> u64 {
        self.era_idx
    }

    fn set_era(&mut self, era: u64) {
        self.era_idx = era;
    }

    fn list(&self) -> &StakeList {
        &self.delegators
    }

    fn list_mut(&mut self) -> &mut StakeList {
        &mut self.delegators
    }

    fn at_era(&self, owner: &str, era: u64) -> Self {
        Self { id: Self::snapshot_id(owner, era), era_idx: era, ..self.clone() }
    }
}

impl FanOut for EraDelegatorIndexer {
    fn new(owner: &str, era: u64) -> Self {
        Self {
            id: owner.to_string(),
            delegator_id: owner.to_string(),
            era_idx: era,
            indexers: StakeList::default(),
        }
    }

    fn era(&self) -> u64 {
        self.era_idx
    }

    fn set_era(&mut self, era: u64) {
        self.era_idx = era;
    }

    fn list(&self) -> &StakeList {
        &self.indexers
    }

    fn list_mut(&mut self) -> &mut StakeList {
        &mut self.indexers
    }

    fn at_era(&self, owner: &str, era: u64) -> Self {
        Self { id: Self::snapshot_id(owner, era), era_idx: era, ..self.clone() }
    }
}

#[derive(Debug, Clone, Copy)]
enum Change {
    Add,
    Remove,
}

impl Change {
    fn apply(self, list: &mut StakeList, counterparty: &str, amount: U256) -> Result<(), HandlerError> {
        match self {
            Change::Add => list.add(counterparty, amount)?,
            Change::Remove => list.remove(counterparty, amount)?,
        }
        Ok(())
    }
}

/// Record `amount` delegated by `delegator` to `indexer` from `era` on, in
/// both directions.
pub async fn add_to_era_delegation(
    store: &dyn EntityStore,
    era: u64,
    indexer: &str,
    delegator: &str,
    amount: U256,
) -> Result<(), HandlerError> {
    mutate::<EraIndexerDelegator>(store, indexer, delegator, era, amount, Change::Add).await?;
    mutate::<EraDelegatorIndexer>(store, delegator, indexer, era, amount, Change::Add).await
}

pub async fn remove_from_era_delegation(
    store: &dyn EntityStore,
    era: u64,
    indexer: &str,
    delegator: &str,
    amount: U256,
) -> Result<(), HandlerError> {
    mutate::<EraIndexerDelegator>(store, indexer, delegator, era, amount, Change::Remove).await?;
    mutate::<EraDelegatorIndexer>(store, delegator, indexer, era, amount, Change::Remove).await
}

async fn mutate<F: FanOut>(
    store: &dyn EntityStore,
    owner: &str,
    counterparty: &str,
    era: u64,
    amount: U256,
    change: Change,
) -> Result<(), HandlerError> {
    let mut live = match store.get::<F>(owner).await? {
        Some(live) => live,
        None => match change {
            Change::Add => F::new(owner, era),
            Change::Remove => {
                return Err(HandlerError::MissingEntity { entity: F::NAME, id: owner.to_string() })
            }
        },
    };

    let previous = live.era();
    if previous > era + 1 {
        return Err(HandlerError::OutOfOrderEra {
            entity: F::NAME,
            id: owner.to_string(),
            stored: previous,
            target: era,
        });
    }

    if previous > era {
        // An instant change lands after the row moved on to the next era.
        let mut current = match store.get::<F>(&F::snapshot_id(owner, era)).await? {
            Some(snapshot) => snapshot,
            None => F::new(owner, era).at_era(owner, era),
        };
        change.apply(current.list_mut(), counterparty, amount)?;
        change.apply(live.list_mut(), counterparty, amount)?;
        store.save(&current).await?;
        store.save(&live.at_era(owner, previous)).await?;
        store.save(&live).await?;
        return Ok(());
    }

    if previous < era {
        fill_forward::<F>(store, owner, previous, era).await?;
    }

    change.apply(live.list_mut(), counterparty, amount)?;
    live.set_era(era);
    store.save(&live.at_era(owner, era)).await?;
    store.save(&live).await?;
    Ok(())
}

/// Write snapshots for every era in `(from, to)` as copies of the snapshot
/// taken at `from`.
async fn fill_forward<F: FanOut>(
    store: &dyn EntityStore,
    owner: &str,
    from: u64,
    to: u64,
) -> Result<(), HandlerError> {
    let from_id = F::snapshot_id(owner, from);
    let Some(last) = store.get::<F>(&from_id).await? else {
        return Err(HandlerError::MissingSnapshot { entity: F::NAME, id: from_id });
    };
    for era in from + 1..to {
        let id = F::snapshot_id(owner, era);
        if !store.exists::<F>(&id).await? {
            store.save(&last.at_era(owner, era)).await?;
        }
    }
    if to > from + 1 {
        tracing::debug!("Filled {} snapshots of {owner} for eras {}..{to}", F::NAME, from + 1);
    }
    Ok(())
}
