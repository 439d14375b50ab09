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

use super::{EventContext, Handlers};
use crate::{
    chain::u256_to_u64,
    contracts::IEraManager,
    entities::CacheKey,
    HandlerError,
};

impl Handlers {
    pub async fn handle_new_era(
        &self,
        ctx: &EventContext<IEraManager::NewEraStart>,
    ) -> Result<(), HandlerError> {
        let era = u256_to_u64("era", ctx.args.era)?;
        self.eras.on_new_era(era, ctx.block_timestamp, ctx.block_number).await
    }

    pub async fn handle_era_period_update(
        &self,
        ctx: &EventContext<IEraManager::EraPeriodUpdate>,
    ) -> Result<(), HandlerError> {
        tracing::info!("Era period set to {}s in era {}", ctx.args.eraPeriod, ctx.args.era);
        self.eras.set_constant(CacheKey::EraPeriod, ctx.args.eraPeriod).await
    }
}
