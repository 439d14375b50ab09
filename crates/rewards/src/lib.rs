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

//! Era-based accounting primitives for staking and delegation rewards.
//!
//! Everything in this crate is pure: no storage, no chain access. The indexer
//! builds its persisted ledgers on top of these types.

use alloy::primitives::U256;
use thiserror::Error;

pub mod codec;
pub mod distribution;
pub mod era_value;
pub mod stake_list;

pub use codec::{decode_big_int, encode_big_int, JsonBigInt};
pub use distribution::{share_of, split_rewards, DelegatorShare, RewardSplit};
pub use era_value::{EraValue, Operation, UNSET_ERA};
pub use stake_list::{StakeEntry, StakeList};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountingError {
    #[error("amount overflow")]
    Overflow,

    #[error("cannot subtract {delta} from {existing}")]
    Underflow { existing: U256, delta: U256 },

    #[error("stored era {stored} is ahead of current era {current}")]
    EraRegression { stored: i64, current: u64 },

    #[error("no stake recorded for counterparty {0}")]
    UnknownCounterparty(String),

    #[error("commission {commission} exceeds total rewards {total_rewards}")]
    CommissionExceedsRewards { total_rewards: U256, commission: U256 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected encoded type: {0}")]
    UnexpectedType(String),

    #[error("invalid hex amount: {0}")]
    InvalidHex(String),
}
