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

use alloy::primitives::{Bytes, B256, U256};
use network_indexer::{
    contracts::IRewardsBooster,
    entities::{
        era_id, pair_id, DeploymentBoosterSummary, EraDeploymentRewards, IndexerAllocationReward,
        IndexerAllocationRewardSummary,
    },
    test_utils::event_ctx,
    HandlerError,
};

use crate::common::{addr, id, u, Harness};

fn deployment() -> B256 {
    B256::repeat_byte(0xd0)
}

fn deployment_id() -> String {
    format!("{:#x}", deployment())
}

async fn allocate(harness: &mut Harness, runner: u8, amount: u64) {
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IRewardsBooster::AllocationRewardsGiven {
            deploymentId: deployment(),
            runner: addr(runner),
            amount: u(amount),
        },
        block,
        ts,
    );
    harness.handlers.handle_allocation_rewards_given(&ctx).await.unwrap();
}

#[tokio::test]
async fn booster_summary_tracks_added_and_removed() {
    let mut harness = Harness::new().await;
    harness.new_era(1).await;

    let (block, ts) = harness.next_block();
    let added = event_ctx(
        IRewardsBooster::DeploymentBoosterAdded {
            deploymentId: deployment(),
            account: addr(5),
            amount: u(100),
        },
        block,
        ts,
    );
    harness.handlers.handle_booster_added(&added).await.unwrap();

    let (block, ts) = harness.next_block();
    let removed = event_ctx(
        IRewardsBooster::DeploymentBoosterRemoved {
            deploymentId: deployment(),
            account: addr(5),
            amount: u(30),
        },
        block,
        ts,
    );
    harness.handlers.handle_booster_removed(&removed).await.unwrap();

    let summary =
        harness.get::<DeploymentBoosterSummary>(&pair_id(&deployment_id(), &id(5))).await.unwrap();
    assert_eq!(summary.total_added, u(100));
    assert_eq!(summary.total_removed, u(30));
    assert_eq!(summary.total_amount, u(70));
    assert_eq!(summary.update_at, ts);

    let (block, ts) = harness.next_block();
    let overdrawn = event_ctx(
        IRewardsBooster::DeploymentBoosterRemoved {
            deploymentId: deployment(),
            account: addr(5),
            amount: u(71),
        },
        block,
        ts,
    );
    let err = harness.handlers.handle_booster_removed(&overdrawn).await.unwrap_err();
    assert!(matches!(err, HandlerError::Accounting(_)), "{err:?}");
}

#[tokio::test]
async fn deployment_rewards_accumulate_per_era() {
    let mut harness = Harness::new().await;
    harness.new_era(1).await;
    allocate(&mut harness, 1, 40).await;
    allocate(&mut harness, 1, 60).await;

    let (block, ts) = harness.next_block();
    let query = event_ctx(
        IRewardsBooster::QueryRewardsSpent {
            deploymentId: deployment(),
            runner: addr(1),
            amount: u(5),
            data: Bytes::new(),
        },
        block,
        ts,
    );
    harness.handlers.handle_query_rewards_spent(&query).await.unwrap();

    let indexer_pair = pair_id(&deployment_id(), &id(1));
    let era1 = harness
        .get::<IndexerAllocationReward>(&pair_id(&indexer_pair, &era_id(1)))
        .await
        .unwrap();
    assert_eq!(era1.reward, u(100));

    let totals = harness
        .get::<EraDeploymentRewards>(&pair_id(&deployment_id(), &era_id(1)))
        .await
        .unwrap();
    assert_eq!(totals.allocation_rewards, u(100));
    assert_eq!(totals.query_rewards, u(5));
    assert_eq!(totals.total_rewards, u(105));

    harness.new_era(2).await;
    allocate(&mut harness, 1, 1).await;
    let summary = harness.get::<IndexerAllocationRewardSummary>(&indexer_pair).await.unwrap();
    assert_eq!(summary.total_reward, u(101));
    let era2 = harness
        .get::<EraDeploymentRewards>(&pair_id(&deployment_id(), &era_id(2)))
        .await
        .unwrap();
    assert_eq!(era2.total_rewards, u(1));
    assert_eq!(era2.query_rewards, U256::ZERO);
}
