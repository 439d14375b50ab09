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
use network_rewards::AccountingError;
use thiserror::Error;

pub mod chain;
pub mod contracts;
pub mod db;
pub mod entities;
pub mod era;
pub mod handlers;
pub mod ledger;
pub mod service;

pub mod test_utils;

pub use handlers::{EventContext, Handlers};
pub use service::{IndexerService, IndexerServiceConfig, ServiceError};

use chain::ChainError;
use db::DbError;
use entities::IllegalTransition;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{entity} {id} not found")]
    MissingEntity { entity: &'static str, id: String },

    #[error("{entity} snapshot {id} not found")]
    MissingSnapshot { entity: &'static str, id: String },

    #[error("{entity} {id} is at era {stored}, cannot apply a change for era {target}")]
    OutOfOrderEra { entity: &'static str, id: String, stored: u64, target: u64 },

    #[error("unknown {kind} value {value}")]
    UnknownEnumValue { kind: &'static str, value: u64 },

    #[error("delegation {delegator} exited {indexer} but earned {reward} in era {era}")]
    ExitRewardNotZero { indexer: String, delegator: String, era: u64, reward: U256 },

    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    #[error("era {current} started after era {stored} was already recorded")]
    EraRegression { stored: u64, current: u64 },

    #[error("accounting error: {0}")]
    Accounting(#[from] AccountingError),

    #[error("cache entry {key} holds invalid value {value:?}")]
    CorruptCache { key: String, value: String },

    #[error("log is missing {0}")]
    IncompleteLog(&'static str),

    #[error("failed to decode log: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    #[error("indexer {0} not found")]
    IndexerNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

impl HandlerError {
    /// Whether the same log can be handled again.
    ///
    /// Handlers resolve every chain read before their first write, so a
    /// transient chain error leaves no state behind. A database error may
    /// strike between two writes and is never retried.
    pub fn is_recoverable(&self) -> bool {
        match self {
            HandlerError::Chain(err) => err.is_transient(),
            _ => false,
        }
    }
}
