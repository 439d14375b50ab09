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

use std::str::FromStr;

use alloy::primitives::U256;
use tokio::sync::RwLock;

use crate::{
    chain::{u256_to_u64, ChainObj},
    db::{StoreExt, StoreObj},
    entities::{era_id, Cache, CacheKey, Era},
    HandlerError,
};

/// Process-wide memo of the current era number.
#[derive(Debug, Default)]
pub struct EraCache {
    current: RwLock<Option<u64>>,
}

impl EraCache {
    pub async fn get(&self) -> Option<u64> {
        *self.current.read().await
    }

    pub async fn set(&self, era: u64) {
        *self.current.write().await = Some(era);
    }

    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }
}

/// Tracks era boundaries and the contract constants handlers depend on.
pub struct EraDirectory {
    store: StoreObj,
    chain: ChainObj,
    cache: EraCache,
}

impl EraDirectory {
    pub fn new(store: StoreObj, chain: ChainObj) -> Self {
        Self { store, chain, cache: EraCache::default() }
    }

    pub fn chain(&self) -> &ChainObj {
        &self.chain
    }

    /// Current era, read through the in-memory memo, then the persisted cache
    /// row, then the era manager contract.
    pub async fn current_era(&self) -> Result<u64, HandlerError> {
        if let Some(era) = self.cache.get().await {
            return Ok(era);
        }
        let era = self.constant(CacheKey::Era).await?;
        let era = u256_to_u64("era", era)?;
        self.cache.set(era).await;
        Ok(era)
    }

    pub async fn era_period(&self) -> Result<u64, HandlerError> {
        let period = self.constant(CacheKey::EraPeriod).await?;
        Ok(u256_to_u64("eraPeriod", period)?)
    }

    pub async fn indexer_leverage_limit(&self) -> Result<U256, HandlerError> {
        self.constant(CacheKey::IndexerLeverageLimit).await
    }

    pub async fn minimum_staking_amount(&self) -> Result<U256, HandlerError> {
        self.constant(CacheKey::MinimumStakingAmount).await
    }

    /// Memoized contract constant, fetched from the chain on first use.
    pub async fn constant(&self, key: CacheKey) -> Result<U256, HandlerError> {
        if let Some(row) = self.store.get::<Cache>(key.as_str()).await? {
            return U256::from_str(&row.value).map_err(|_| HandlerError::CorruptCache {
                key: key.to_string(),
                value: row.value.clone(),
            });
        }

        let chain = &self.chain;
        let value = match key {
            CacheKey::Era => U256::from(chain.era_number().await?),
            CacheKey::EraPeriod => U256::from(chain.era_period().await?),
            CacheKey::IndexerLeverageLimit => chain.indexer_leverage_limit().await?,
            CacheKey::MinimumStakingAmount => chain.minimum_staking_amount().await?,
            CacheKey::LastProcessedBlock => {
                return Err(HandlerError::MissingEntity { entity: "Cache", id: key.to_string() })
            }
        };
        tracing::debug!("Fetched {key} = {value} from chain");
        self.set_constant(key, value).await?;
        Ok(value)
    }

    pub async fn set_constant(&self, key: CacheKey, value: U256) -> Result<(), HandlerError> {
        self.store.save(&Cache { id: key.as_str().to_string(), value: value.to_string() }).await?;
        if key == CacheKey::Era {
            self.cache.invalidate().await;
        }
        Ok(())
    }

    /// Open era `era` at `timestamp` and close the previous one.
    ///
    /// The era period is resolved before anything is written so a failed
    /// contract call leaves the directory untouched.
    pub async fn on_new_era(&self, era: u64, timestamp: u64, block: u64) -> Result<(), HandlerError> {
        let period = self.era_period().await?;

        if self.store.exists::<Era>(&era_id(era + 1)).await? {
            return Err(HandlerError::EraRegression { stored: era + 1, current: era });
        }

        if era > 1 {
            let previous_id = era_id(era - 1);
            let previous = match self.store.get::<Era>(&previous_id).await? {
                Some(mut previous) => {
                    previous.force_next =
                        timestamp < previous.start_time.saturating_add(previous.era_period);
                    previous.end_time = Some(timestamp);
                    previous
                }
                None => {
                    tracing::info!("Era {} was never observed, back-filling it", era - 1);
                    Era {
                        id: previous_id,
                        start_time: timestamp.saturating_sub(period),
                        end_time: Some(timestamp),
                        era_period: period,
                        force_next: false,
                        created_block: None,
                    }
                }
            };
            self.store.save(&previous).await?;
        }

        self.store
            .save(&Era {
                id: era_id(era),
                start_time: timestamp,
                end_time: None,
                era_period: period,
                force_next: false,
                created_block: Some(block),
            })
            .await?;

        self.set_constant(CacheKey::Era, U256::from(era)).await?;
        self.cache.set(era).await;
        tracing::info!("Era {era} started at {timestamp} (period {period}s)");
        Ok(())
    }
}
