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

use std::{cmp::min, collections::HashMap, sync::Arc};

use alloy::{
    eips::BlockNumberOrTag,
    network::Ethereum,
    primitives::B256,
    providers::{
        fillers::{ChainIdFiller, FillProvider, JoinFill},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::{
        client::RpcClient,
        types::{Filter, Log},
    },
    sol_types::SolEvent,
    transports::{layers::RetryBackoffLayer, RpcError, TransportErrorKind},
};
use anyhow::{anyhow, Context};
use thiserror::Error;
use tokio::time::Duration;
use url::Url;

use crate::{
    chain::{ChainError, ChainObj, ContractAddresses, RpcChainClient},
    contracts::{IEraManager, IIndexerRegistry, IRewardsBooster, IRewardsDistributor, IStaking},
    db::{AnyStore, DbError, StoreExt, StoreObj},
    entities::{Cache, CacheKey},
    handlers::Handlers,
    HandlerError,
};

const EVENT_SIGNATURES: &[B256] = &[
    IEraManager::NewEraStart::SIGNATURE_HASH,
    IEraManager::EraPeriodUpdate::SIGNATURE_HASH,
    IIndexerRegistry::RegisterIndexer::SIGNATURE_HASH,
    IIndexerRegistry::UnregisterIndexer::SIGNATURE_HASH,
    IIndexerRegistry::SetCommissionRate::SIGNATURE_HASH,
    IIndexerRegistry::SetMinimumStakingAmount::SIGNATURE_HASH,
    IStaking::SetIndexerLeverageLimit::SIGNATURE_HASH,
    IStaking::DelegationAdded::SIGNATURE_HASH,
    IStaking::DelegationRemoved::SIGNATURE_HASH,
    IStaking::UnbondRequested::SIGNATURE_HASH,
    IStaking::UnbondWithdrawn::SIGNATURE_HASH,
    IStaking::UnbondCancelled::SIGNATURE_HASH,
    IRewardsDistributor::DistributeRewards::SIGNATURE_HASH,
    IRewardsDistributor::ClaimRewards::SIGNATURE_HASH,
    IRewardsBooster::DeploymentBoosterAdded::SIGNATURE_HASH,
    IRewardsBooster::DeploymentBoosterRemoved::SIGNATURE_HASH,
    IRewardsBooster::AllocationRewardsGiven::SIGNATURE_HASH,
    IRewardsBooster::QueryRewardsSpent::SIGNATURE_HASH,
];

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Handler error: {0}")]
    HandlerError(#[from] HandlerError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbError),

    #[error("RPC error: {0}")]
    RpcError(#[from] RpcError<TransportErrorKind>),

    #[error("Chain error: {0}")]
    ChainError(#[from] ChainError),

    #[error("Error: {0}")]
    Error(#[from] anyhow::Error),

    #[error("Maximum retries reached")]
    MaxRetries,
}

impl ServiceError {
    fn is_recoverable(&self) -> bool {
        match self {
            ServiceError::HandlerError(err) => err.is_recoverable(),
            ServiceError::ChainError(err) => err.is_transient(),
            ServiceError::RpcError(_) => true,
            ServiceError::DatabaseError(_) | ServiceError::Error(_) | ServiceError::MaxRetries => {
                false
            }
        }
    }
}

#[derive(Clone)]
pub struct IndexerServiceConfig {
    pub interval: Duration,
    pub retries: u32,
    pub batch_size: u64,
}

type ProviderType = FillProvider<JoinFill<Identity, ChainIdFiller>, RootProvider>;

pub struct IndexerService<P> {
    provider: P,
    handlers: Handlers,
    addresses: ContractAddresses,
    config: IndexerServiceConfig,
    block_timestamps: HashMap<u64, u64>,
    cursor: LogCursor,
}

/// Position `(block, log index)` of the last log handled in the range being
/// processed. A retried range resumes after it.
#[derive(Debug, Default)]
struct LogCursor {
    last: Option<(u64, u64)>,
}

impl LogCursor {
    fn position(&self) -> Option<(u64, u64)> {
        self.last
    }

    fn reset(&mut self) {
        self.last = None;
    }

    /// Hand every sorted log past the cursor to its handler, advancing the
    /// cursor after each one that succeeds.
    async fn dispatch(
        &mut self,
        handlers: &Handlers,
        logs: &[Log],
        timestamps: &HashMap<u64, u64>,
    ) -> Result<(), ServiceError> {
        for log in logs {
            let position = log_position(log)?;
            if self.last.is_some_and(|last| position <= last) {
                continue;
            }

            let (block, _) = position;
            let timestamp = log
                .block_timestamp
                .or_else(|| timestamps.get(&block).copied())
                .with_context(|| format!("Missing timestamp of block {block}"))?;
            handlers.dispatch(log, timestamp).await?;
            self.last = Some(position);
        }
        Ok(())
    }
}

fn log_position(log: &Log) -> Result<(u64, u64), ServiceError> {
    let block = log.block_number.context("Log without block number")?;
    let index = log.log_index.context("Log without log index")?;
    Ok((block, index))
}

/// Chain order: block, then transaction, then position in the receipt.
fn sort_logs(logs: &mut [Log]) {
    logs.sort_by_key(|log| (log.block_number, log.transaction_index, log.log_index));
}

async fn load_last_processed_block(store: &StoreObj) -> Result<Option<u64>, ServiceError> {
    let key = CacheKey::LastProcessedBlock.as_str();
    let Some(row) = store.get::<Cache>(key).await? else {
        return Ok(None);
    };
    let block = row
        .value
        .parse::<u64>()
        .with_context(|| format!("Invalid last processed block {:?}", row.value))?;
    Ok(Some(block))
}

async fn save_last_processed_block(
    store: &StoreObj,
    block_number: u64,
) -> Result<(), ServiceError> {
    let row = Cache {
        id: CacheKey::LastProcessedBlock.as_str().to_string(),
        value: block_number.to_string(),
    };
    store.save(&row).await?;
    Ok(())
}

impl IndexerService<ProviderType> {
    pub async fn new(
        rpc_url: Url,
        addresses: ContractAddresses,
        db_conn: &str,
        config: IndexerServiceConfig,
        expected_chain_id: Option<u64>,
    ) -> Result<Self, ServiceError> {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .filler(ChainIdFiller::default())
            .connect_client(
                RpcClient::builder().layer(RetryBackoffLayer::new(3, 1000, 200)).http(rpc_url),
            );
        let store: StoreObj = Arc::new(AnyStore::new(db_conn).await?);
        let chain: ChainObj = Arc::new(RpcChainClient::new(provider.clone(), addresses));

        let chain_id = chain.chain_id().await?;
        if let Some(expected) = expected_chain_id {
            if expected != chain_id {
                return Err(anyhow!("Connected to chain {chain_id}, expected {expected}").into());
            }
        }
        tracing::info!("Connected to chain {chain_id}");

        Ok(Self::from_parts(provider, Handlers::new(store, chain), addresses, config))
    }
}

impl<P> IndexerService<P>
where
    P: Provider<Ethereum> + 'static + Clone,
{
    pub fn from_parts(
        provider: P,
        handlers: Handlers,
        addresses: ContractAddresses,
        config: IndexerServiceConfig,
    ) -> Self {
        Self {
            provider,
            handlers,
            addresses,
            config,
            block_timestamps: HashMap::new(),
            cursor: LogCursor::default(),
        }
    }

    pub async fn run(
        &mut self,
        starting_block: Option<u64>,
        end_block: Option<u64>,
    ) -> Result<(), ServiceError> {
        let mut interval = tokio::time::interval(self.config.interval);
        let mut from_block = self.starting_block(starting_block).await?;

        if let Some(end) = end_block {
            if end < from_block {
                return Err(anyhow!("End block {end} is less than starting block {from_block}").into());
            }
            tracing::info!("Starting indexer at block {} (will stop at block {})", from_block, end);
        } else {
            tracing::info!("Starting indexer at block {}", from_block);
        }

        let mut attempt = 0;
        loop {
            interval.tick().await;

            let max_block = match self.current_block().await {
                Ok(to_block) => end_block.map_or(to_block, |end| min(to_block, end)),
                Err(e) => {
                    attempt += 1;
                    tracing::warn!(
                        "Failed to fetch current block: {:?}, attempt number {}",
                        e,
                        attempt
                    );
                    if attempt > self.config.retries {
                        tracing::error!("Aborting after {} consecutive attempts", attempt);
                        return Err(ServiceError::MaxRetries);
                    }
                    continue;
                }
            };

            if max_block < from_block {
                if end_block.is_some_and(|end| from_block > end) {
                    tracing::info!("Reached end block, exiting");
                    return Ok(());
                }
                continue;
            }

            let batch_end = min(max_block, from_block.saturating_add(self.config.batch_size));

            let start = std::time::Instant::now();
            match self.process_blocks(from_block, batch_end).await {
                Ok(_) => {
                    tracing::info!(
                        "process_blocks completed in {:?} [num_blocks={}]",
                        start.elapsed(),
                        batch_end - from_block + 1
                    );
                    attempt = 0;
                    from_block = batch_end + 1;

                    if end_block.is_some_and(|end| from_block > end) {
                        tracing::info!("Reached end block {}, exiting", batch_end);
                        return Ok(());
                    }
                }
                Err(e) if e.is_recoverable() => {
                    attempt += 1;
                    // exponential backoff with a maximum delay of 120 seconds
                    let delay = Duration::from_secs(2u64.pow(attempt - 1).min(120));
                    tracing::warn!(
                        "Failed to process blocks from {} to {}: {:?}, attempt number {}, retrying in {}s",
                        from_block,
                        batch_end,
                        e,
                        attempt,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to process blocks from {} to {}: {:?}",
                        from_block,
                        batch_end,
                        e
                    );
                    return Err(e);
                }
            }

            if attempt > self.config.retries {
                tracing::error!("Aborting after {} consecutive attempts", attempt);
                return Err(ServiceError::MaxRetries);
            }
        }
    }

    /// Handle every log of the range in chain order. A retried range resumes
    /// after the last log that was handled successfully.
    pub async fn process_blocks(&mut self, from: u64, to: u64) -> Result<(), ServiceError> {
        tracing::debug!("Processing blocks from {} to {}", from, to);
        let mut logs = self.fetch_logs(from, to).await?;
        sort_logs(&mut logs);

        for log in &logs {
            if log.block_timestamp.is_none() {
                let (block, _) = log_position(log)?;
                self.block_timestamp(block).await?;
            }
        }
        if let Some((block, index)) = self.cursor.position() {
            tracing::debug!("Resuming after log {index} of block {block}");
        }
        self.cursor.dispatch(&self.handlers, &logs, &self.block_timestamps).await?;

        save_last_processed_block(self.handlers.store(), to).await?;
        self.cursor.reset();
        self.block_timestamps.clear();
        Ok(())
    }

    async fn fetch_logs(&self, from: u64, to: u64) -> Result<Vec<Log>, ServiceError> {
        let filter = Filter::new()
            .address(self.addresses.all())
            .from_block(from)
            .to_block(to)
            .event_signature(EVENT_SIGNATURES.to_vec());

        let logs = self.provider.get_logs(&filter).await?;
        tracing::debug!("Fetched {} logs from block {} to block {}", logs.len(), from, to);
        Ok(logs)
    }

    async fn block_timestamp(&mut self, block_number: u64) -> Result<u64, ServiceError> {
        if let Some(ts) = self.block_timestamps.get(&block_number) {
            return Ok(*ts);
        }
        let ts = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await?
            .context(anyhow!("Failed to get block by number: {}", block_number))?
            .header
            .timestamp;
        self.block_timestamps.insert(block_number, ts);
        Ok(ts)
    }

    async fn starting_block(&self, starting_block: Option<u64>) -> Result<u64, ServiceError> {
        if let Some(block) = starting_block {
            return Ok(block);
        }
        match load_last_processed_block(self.handlers.store()).await? {
            Some(last) => Ok(last + 1),
            None => self.current_block().await,
        }
    }

    async fn current_block(&self) -> Result<u64, ServiceError> {
        Ok(self.provider.get_block_number().await?)
    }
}
