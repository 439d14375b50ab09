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

use std::sync::Arc;

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::Provider,
    transports::{RpcError, TransportErrorKind},
};
use async_trait::async_trait;
use thiserror::Error;

use crate::contracts::{IEraManager, IIndexerRegistry, IStaking};

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),

    #[error("Contract call error: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("Chain unavailable: {0}")]
    Unavailable(String),

    #[error("{what} value {value} does not fit in u64")]
    OutOfRange { what: &'static str, value: U256 },
}

impl ChainError {
    /// Whether repeating the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ChainError::OutOfRange { .. })
    }
}

/// Read-only view of the network contracts.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ChainError>;

    async fn era_number(&self) -> Result<u64, ChainError>;

    /// Era length in seconds.
    async fn era_period(&self) -> Result<u64, ChainError>;

    async fn indexer_leverage_limit(&self) -> Result<U256, ChainError>;

    async fn minimum_staking_amount(&self) -> Result<U256, ChainError>;
}

pub type ChainObj = Arc<dyn ChainClient>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub era_manager: Address,
    pub staking: Address,
    pub indexer_registry: Address,
    pub rewards_distributor: Address,
    pub rewards_booster: Address,
}

impl ContractAddresses {
    pub fn all(&self) -> Vec<Address> {
        vec![
            self.era_manager,
            self.staking,
            self.indexer_registry,
            self.rewards_distributor,
            self.rewards_booster,
        ]
    }
}

pub struct RpcChainClient<P> {
    provider: P,
    addresses: ContractAddresses,
}

impl<P> RpcChainClient<P> {
    pub fn new(provider: P, addresses: ContractAddresses) -> Self {
        Self { provider, addresses }
    }
}

#[async_trait]
impl<P> ChainClient for RpcChainClient<P>
where
    P: Provider<Ethereum> + Send + Sync + 'static,
{
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn era_number(&self) -> Result<u64, ChainError> {
        let era_manager = IEraManager::new(self.addresses.era_manager, &self.provider);
        let era = era_manager.eraNumber().call().await?;
        u256_to_u64("eraNumber", era)
    }

    async fn era_period(&self) -> Result<u64, ChainError> {
        let era_manager = IEraManager::new(self.addresses.era_manager, &self.provider);
        let period = era_manager.eraPeriod().call().await?;
        u256_to_u64("eraPeriod", period)
    }

    async fn indexer_leverage_limit(&self) -> Result<U256, ChainError> {
        let staking = IStaking::new(self.addresses.staking, &self.provider);
        Ok(staking.indexerLeverageLimit().call().await?)
    }

    async fn minimum_staking_amount(&self) -> Result<U256, ChainError> {
        let registry = IIndexerRegistry::new(self.addresses.indexer_registry, &self.provider);
        Ok(registry.minimumStakingAmount().call().await?)
    }
}

pub fn u256_to_u64(what: &'static str, value: U256) -> Result<u64, ChainError> {
    if value > U256::from(u64::MAX) {
        return Err(ChainError::OutOfRange { what, value });
    }
    Ok(value.to::<u64>())
}
