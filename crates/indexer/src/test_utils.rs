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

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use alloy::primitives::{B256, U256};
use async_trait::async_trait;
use sqlx::any::install_default_drivers;
use sqlx::AnyPool;
use tempfile::NamedTempFile;

use crate::{
    chain::{ChainClient, ChainError},
    db::{AnyStore, DbError, StoreObj},
    handlers::EventContext,
};

pub struct TestDb {
    pub store: Arc<AnyStore>,
    pub db_url: String,
    pub pool: AnyPool,
    pub _temp_file: Option<NamedTempFile>,
}

impl TestDb {
    pub async fn new() -> Result<Self, DbError> {
        install_default_drivers();

        // Lets you run the DB tests against PostgreSQL, via setting INDEXER_DATABASE_URL
        // This is only supported for testing with --test-threads=1
        if let Ok(db_url) = std::env::var("INDEXER_DATABASE_URL") {
            if db_url.starts_with("postgres") {
                let pool = AnyPool::connect(&db_url).await?;
                let store = Arc::new(AnyStore::new(&db_url).await?);
                let test_db = Self { store, db_url, pool, _temp_file: None };
                test_db.cleanup().await?;
                tracing::info!("Testing with Postgres. Must only run with --test-threads=1");
                return Ok(test_db);
            }
        }

        // Default: SQLite with temp file
        let temp_file = NamedTempFile::new().map_err(|e| DbError::SqlErr(sqlx::Error::Io(e)))?;
        let db_url = format!("sqlite:{}", temp_file.path().display());
        let pool = AnyPool::connect(&db_url).await?;
        let store = Arc::new(AnyStore::new(&db_url).await?);

        Ok(Self { store, db_url, pool, _temp_file: Some(temp_file) })
    }

    pub fn get_store(&self) -> StoreObj {
        self.store.clone()
    }

    pub async fn cleanup(&self) -> Result<(), DbError> {
        if self.db_url.starts_with("postgres") {
            sqlx::query("DELETE FROM entities").execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Programmable [ChainClient] for tests.
pub struct MockChain {
    chain_id: u64,
    era: AtomicU64,
    era_period: AtomicU64,
    leverage_limit: AtomicU64,
    minimum_staking_amount: AtomicU64,
    fail: AtomicBool,
    era_number_calls: AtomicUsize,
}

impl MockChain {
    pub fn new(era: u64, era_period: u64) -> Self {
        Self {
            chain_id: 31337,
            era: AtomicU64::new(era),
            era_period: AtomicU64::new(era_period),
            leverage_limit: AtomicU64::new(10),
            minimum_staking_amount: AtomicU64::new(0),
            fail: AtomicBool::new(false),
            era_number_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_era(&self, era: u64) {
        self.era.store(era, Ordering::SeqCst);
    }

    pub fn set_leverage_limit(&self, limit: U256) {
        self.leverage_limit.store(limit.to::<u64>(), Ordering::SeqCst);
    }

    pub fn set_minimum_staking_amount(&self, amount: U256) {
        self.minimum_staking_amount.store(amount.to::<u64>(), Ordering::SeqCst);
    }

    /// Make every subsequent call fail with a transient error.
    pub fn fail_calls(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn era_number_calls(&self) -> usize {
        self.era_number_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ChainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChainError::Unavailable("mock chain is failing".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.check()?;
        Ok(self.chain_id)
    }

    async fn era_number(&self) -> Result<u64, ChainError> {
        self.check()?;
        self.era_number_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.era.load(Ordering::SeqCst))
    }

    async fn era_period(&self) -> Result<u64, ChainError> {
        self.check()?;
        Ok(self.era_period.load(Ordering::SeqCst))
    }

    async fn indexer_leverage_limit(&self) -> Result<U256, ChainError> {
        self.check()?;
        Ok(U256::from(self.leverage_limit.load(Ordering::SeqCst)))
    }

    async fn minimum_staking_amount(&self) -> Result<U256, ChainError> {
        self.check()?;
        Ok(U256::from(self.minimum_staking_amount.load(Ordering::SeqCst)))
    }
}

/// Wrap `args` as if emitted by the first log of a transaction in
/// `block_number`.
pub fn event_ctx<E>(args: E, block_number: u64, block_timestamp: u64) -> EventContext<E> {
    EventContext {
        args,
        block_number,
        block_hash: B256::from(U256::from(block_number).to_be_bytes::<32>()),
        tx_hash: B256::from((U256::from(block_number) << 128usize).to_be_bytes::<32>()),
        log_index: 0,
        block_timestamp,
    }
}
