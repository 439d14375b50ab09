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

use serde::{Deserialize, Serialize};

/// One era of the network, keyed by the era index in hex.
///
/// `end_time` stays unset while the era is current and is filled in when the
/// next era starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Era {
    pub id: String,
    pub start_time: u64,
    pub end_time: Option<u64>,
    pub era_period: u64,
    pub force_next: bool,
    pub created_block: Option<u64>,
}

/// Keys of the persisted string cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Era,
    EraPeriod,
    IndexerLeverageLimit,
    MinimumStakingAmount,
    LastProcessedBlock,
}

impl CacheKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::Era => "era",
            CacheKey::EraPeriod => "eraPeriod",
            CacheKey::IndexerLeverageLimit => "indexerLeverageLimit",
            CacheKey::MinimumStakingAmount => "minimumStakingAmount",
            CacheKey::LastProcessedBlock => "lastProcessedBlock",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cache {
    pub id: String,
    pub value: String,
}

impl_entity!(Era => "Era", Cache => "Cache");
