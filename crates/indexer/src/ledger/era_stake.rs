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
use network_rewards::Operation;

use crate::{
    db::{EntityStore, StoreExt},
    entities::{era_id, pair_id, EraStake, EraStakeUpdate},
    HandlerError,
};

/// Apply `delta` to the absolute stake of the (indexer, delegator) pair in
/// `era`.
///
/// A pair seen for the first time in `era` starts from the amount recorded
/// at its last update, found through the pair's `EraStakeUpdate` pointer.
pub async fn update_era_stake(
    store: &dyn EntityStore,
    indexer: &str,
    delegator: &str,
    era: u64,
    delta: U256,
    op: Operation,
) -> Result<EraStake, HandlerError> {
    let pair = pair_id(indexer, delegator);
    let id = pair_id(&pair, &era_id(era));
    let pointer = store.get::<EraStakeUpdate>(&pair).await?;

    if let Some(pointer) = &pointer {
        if pointer.last_update_by_era > era {
            return Err(HandlerError::OutOfOrderEra {
                entity: "EraStake",
                id: pair,
                stored: pointer.last_update_by_era,
                target: era,
            });
        }
    }

    let mut row = match store.get::<EraStake>(&id).await? {
        Some(row) => row,
        None => {
            let stake = match &pointer {
                Some(pointer) => {
                    let last_id = pair_id(&pair, &era_id(pointer.last_update_by_era));
                    store
                        .get::<EraStake>(&last_id)
                        .await?
                        .ok_or(HandlerError::MissingSnapshot { entity: "EraStake", id: last_id })?
                        .stake
                }
                None => U256::ZERO,
            };
            EraStake {
                id,
                indexer_id: indexer.to_string(),
                delegator_id: delegator.to_string(),
                era_id: era_id(era),
                era_idx: era,
                stake,
            }
        }
    };

    row.stake = op.apply(row.stake, delta)?;
    store.save(&row).await?;
    store.save(&EraStakeUpdate { id: pair, last_update_by_era: era }).await?;
    Ok(row)
}
