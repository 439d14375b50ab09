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

use alloy::{
    primitives::{Address, Bytes, Log as PrimitiveLog, LogData, B256, U256},
    rpc::types::Log,
    sol_types::SolEvent,
};
use network_indexer::{
    contracts::IEraManager,
    db::StoreExt,
    entities::{era_id, Cache, CacheKey, Era},
    test_utils::event_ctx,
    HandlerError,
};

use crate::common::{u, Harness};

fn rpc_log(data: LogData, block: u64) -> Log {
    Log {
        inner: PrimitiveLog { address: Address::repeat_byte(0xee), data },
        block_hash: Some(B256::repeat_byte(1)),
        block_number: Some(block),
        block_timestamp: None,
        transaction_hash: Some(B256::repeat_byte(2)),
        transaction_index: Some(0),
        log_index: Some(3),
        removed: false,
    }
}

#[tokio::test]
async fn dispatched_era_start_backfills_unseen_previous_era() {
    let harness = Harness::new().await;
    let event = IEraManager::NewEraStart { era: u(5), caller: Address::ZERO };
    let log = rpc_log(event.encode_log_data(), 40);

    harness.handlers.dispatch(&log, 100_000).await.unwrap();

    let current = harness.get::<Era>(&era_id(5)).await.unwrap();
    assert_eq!(current.start_time, 100_000);
    assert_eq!(current.created_block, Some(40));
    assert_eq!(current.end_time, None);

    let previous = harness.get::<Era>(&era_id(4)).await.unwrap();
    assert_eq!(previous.start_time, 100_000 - 3_600);
    assert_eq!(previous.end_time, Some(100_000));
    assert_eq!(previous.created_block, None);

    assert_eq!(harness.handlers.eras().current_era().await.unwrap(), 5);
    let cached = harness.get::<Cache>(CacheKey::Era.as_str()).await.unwrap();
    assert_eq!(cached.value, "5");
}

#[tokio::test]
async fn logs_of_other_events_are_ignored() {
    let harness = Harness::new().await;
    let data = LogData::new_unchecked(vec![B256::repeat_byte(0xab)], Bytes::new());
    harness.handlers.dispatch(&rpc_log(data, 1), 0).await.unwrap();
    harness.handlers.dispatch(&rpc_log(LogData::default(), 1), 0).await.unwrap();
}

#[tokio::test]
async fn logs_without_position_are_rejected() {
    let harness = Harness::new().await;
    let event = IEraManager::NewEraStart { era: u(1), caller: Address::ZERO };
    let mut log = rpc_log(event.encode_log_data(), 1);
    log.block_number = None;

    let err = harness.handlers.dispatch(&log, 0).await.unwrap_err();
    assert!(matches!(err, HandlerError::IncompleteLog("block number")), "{err:?}");
}

#[tokio::test]
async fn failed_period_lookup_writes_nothing() {
    let mut harness = Harness::new().await;
    harness.chain.fail_calls(true);
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(IEraManager::NewEraStart { era: u(2), caller: Address::ZERO }, block, ts);

    let err = harness.handlers.handle_new_era(&ctx).await.unwrap_err();
    assert!(err.is_recoverable());
    assert!(!harness.store.exists::<Era>(&era_id(1)).await.unwrap());
    assert!(!harness.store.exists::<Era>(&era_id(2)).await.unwrap());

    harness.chain.fail_calls(false);
    harness.handlers.handle_new_era(&ctx).await.unwrap();
    assert!(harness.store.exists::<Era>(&era_id(2)).await.unwrap());
}

#[tokio::test]
async fn early_era_start_forces_previous_era() {
    let mut harness = Harness::new().await;
    harness.new_era(1).await;
    let start = harness.get::<Era>(&era_id(1)).await.unwrap().start_time;

    let event = IEraManager::NewEraStart { era: u(2), caller: Address::ZERO };
    let ctx = event_ctx(event, 99, start + 60);
    harness.handlers.handle_new_era(&ctx).await.unwrap();

    let previous = harness.get::<Era>(&era_id(1)).await.unwrap();
    assert!(previous.force_next);
    assert_eq!(previous.end_time, Some(start + 60));
}

#[tokio::test]
async fn replayed_era_start_is_a_regression() {
    let mut harness = Harness::new().await;
    harness.new_era(1).await;
    harness.new_era(2).await;

    let (block, ts) = harness.next_block();
    let ctx = event_ctx(IEraManager::NewEraStart { era: u(1), caller: Address::ZERO }, block, ts);
    let err = harness.handlers.handle_new_era(&ctx).await.unwrap_err();
    assert!(matches!(err, HandlerError::EraRegression { stored: 2, current: 1 }), "{err:?}");
    assert_eq!(harness.handlers.eras().current_era().await.unwrap(), 2);
}

#[tokio::test]
async fn period_update_applies_to_the_next_era() {
    let mut harness = Harness::new().await;
    harness.new_era(1).await;

    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IEraManager::EraPeriodUpdate { era: u(1), eraPeriod: U256::from(7_200) },
        block,
        ts,
    );
    harness.handlers.handle_era_period_update(&ctx).await.unwrap();
    assert_eq!(harness.handlers.eras().era_period().await.unwrap(), 7_200);
    assert_eq!(harness.get::<Era>(&era_id(1)).await.unwrap().era_period, 3_600);

    harness.new_era(2).await;
    assert_eq!(harness.get::<Era>(&era_id(2)).await.unwrap().era_period, 7_200);
}
