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

//! Era-partitioned stake aggregates maintained by the staking handlers.

pub mod era_stake;
pub mod fanout;
pub mod summary;
pub mod totals;

pub use era_stake::update_era_stake;
pub use fanout::{add_to_era_delegation, remove_from_era_delegation, FanOut};
pub use summary::{apply_stake_delta, StakeDirection};
pub use totals::refresh_capacity;
