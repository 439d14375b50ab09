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
use network_indexer::{
    contracts::{IIndexerRegistry, IStaking},
    db::StoreExt,
    entities::{
        era_id, pair_id, Cache, CacheKey, Delegation, Delegator, EraIndexerDelegator, EraStake,
        Exception, Indexer, IndexerStake, IndexerStakeSummary, ALL_INDEXERS_ID,
    },
    test_utils::event_ctx,
    HandlerError,
};
use network_rewards::EraValue;

use crate::common::{addr, id, u, Harness};

async fn fan_out(harness: &Harness, indexer: u8, era: u64) -> Option<EraIndexerDelegator> {
    harness.get::<EraIndexerDelegator>(&pair_id(&id(indexer), &era_id(era))).await
}

#[tokio::test]
async fn first_self_stake_applies_instantly() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;
    harness.delegate(1, 1, 100).await.unwrap();

    let summary = harness.get::<IndexerStakeSummary>(&id(1)).await.unwrap();
    assert_eq!(summary.era_idx, 1);
    assert_eq!(summary.total_stake, u(100));
    assert_eq!(summary.indexer_stake, u(100));
    assert_eq!(summary.next_total_stake, u(100));

    for era in [1, 2] {
        let stake = harness.get::<IndexerStake>(&pair_id(&id(1), &era_id(era))).await.unwrap();
        assert_eq!(stake.total_stake, u(100), "era {era}");
        assert_eq!(stake.delegator_stake, U256::ZERO);
    }
    let all = harness.get::<IndexerStakeSummary>(ALL_INDEXERS_ID).await.unwrap();
    assert_eq!(all.total_stake, u(100));

    let delegation = harness.get::<Delegation>(&pair_id(&id(1), &id(1))).await.unwrap();
    assert_eq!(delegation.amount, EraValue { era: 1, value: u(100), value_after: u(100) });

    let indexer = harness.get::<Indexer>(&id(1)).await.unwrap();
    assert_eq!(indexer.self_stake.value, u(100));
    // leverage limit 10 from the mock chain
    assert_eq!(indexer.capacity.value, u(900));
    assert_eq!(indexer.max_unstake_amount.value, u(100));

    let stake = harness.get::<EraStake>(&pair_id(&pair_id(&id(1), &id(1)), &era_id(1))).await;
    assert_eq!(stake.unwrap().stake, u(100));
    assert_eq!(fan_out(&harness, 1, 1).await.unwrap().delegators.get(&id(1)), Some(u(100)));
}

#[tokio::test]
async fn self_stake_before_registration_creates_indexer() {
    let mut harness = Harness::new().await;
    harness.new_era(1).await;
    harness.delegate(1, 1, 100).await.unwrap();
    harness.register(1).await;

    let indexer = harness.get::<Indexer>(&id(1)).await.unwrap();
    assert_eq!(indexer.total_stake.value, u(100));
    assert_eq!(indexer.metadata, format!("{:#x}", alloy::primitives::B256::repeat_byte(1)));
}

#[tokio::test]
async fn later_delegations_take_effect_next_era() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;
    harness.delegate(1, 1, 100).await.unwrap();
    harness.new_era(2).await;
    harness.delegate(2, 1, 50).await.unwrap();

    let delegation = harness.get::<Delegation>(&pair_id(&id(2), &id(1))).await.unwrap();
    assert_eq!(delegation.amount, EraValue { era: 2, value: U256::ZERO, value_after: u(50) });
    let delegator = harness.get::<Delegator>(&id(2)).await.unwrap();
    assert_eq!(delegator.start_era, 3);

    let summary = harness.get::<IndexerStakeSummary>(&id(1)).await.unwrap();
    assert_eq!(summary.total_stake, u(100));
    assert_eq!(summary.next_total_stake, u(150));
    assert_eq!(summary.next_delegator_stake, u(50));

    // era 2 repeats era 1, era 3 carries the new delegation
    let era2 = fan_out(&harness, 1, 2).await.unwrap();
    assert_eq!(era2.delegators.total, u(100));
    assert_eq!(era2.delegators.get(&id(2)), None);
    let era3 = fan_out(&harness, 1, 3).await.unwrap();
    assert_eq!(era3.delegators.get(&id(2)), Some(u(50)));
    assert_eq!(era3.delegators.total, u(150));

    let indexer = harness.get::<Indexer>(&id(1)).await.unwrap();
    assert_eq!(indexer.total_stake, EraValue { era: 2, value: u(100), value_after: u(150) });
}

#[tokio::test]
async fn quiet_eras_are_filled_forward() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;
    harness.delegate(1, 1, 100).await.unwrap();
    for era in 2..=4 {
        harness.new_era(era).await;
    }
    harness.delegate(2, 1, 10).await.unwrap();

    for era in 2..=4 {
        let snapshot = fan_out(&harness, 1, era).await.unwrap();
        assert_eq!(snapshot.era_idx, era);
        assert_eq!(snapshot.delegators.total, u(100));
    }
    assert_eq!(fan_out(&harness, 1, 5).await.unwrap().delegators.total, u(110));
}

#[tokio::test]
async fn full_undelegation_sets_exit_era() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;
    harness.delegate(1, 1, 100).await.unwrap();
    harness.delegate(2, 1, 40).await.unwrap();
    harness.new_era(2).await;
    harness.new_era(3).await;
    harness.undelegate(2, 1, 40).await.unwrap();

    let delegation = harness.get::<Delegation>(&pair_id(&id(2), &id(1))).await.unwrap();
    assert_eq!(delegation.amount, EraValue { era: 3, value: u(40), value_after: U256::ZERO });
    assert_eq!(delegation.exit_era, Some(4));
    assert_eq!(harness.get::<Delegator>(&id(2)).await.unwrap().exit_era, Some(4));

    assert_eq!(fan_out(&harness, 1, 3).await.unwrap().delegators.get(&id(2)), Some(u(40)));
    assert_eq!(fan_out(&harness, 1, 4).await.unwrap().delegators.get(&id(2)), None);

    let stake = harness.get::<EraStake>(&pair_id(&pair_id(&id(1), &id(2)), &era_id(4))).await;
    assert_eq!(stake.unwrap().stake, U256::ZERO);
}

#[tokio::test]
async fn removing_more_than_delegated_fails() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;
    harness.delegate(1, 1, 100).await.unwrap();
    harness.delegate(2, 1, 10).await.unwrap();

    let err = harness.undelegate(2, 1, 11).await.unwrap_err();
    assert!(matches!(err, HandlerError::Accounting(_)), "{err:?}");
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn removing_unknown_delegation_fails() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;

    let err = harness.undelegate(2, 1, 10).await.unwrap_err();
    assert!(matches!(err, HandlerError::MissingEntity { entity: "Delegation", .. }), "{err:?}");
}

#[tokio::test]
async fn delegation_to_unknown_indexer_is_recorded() {
    let mut harness = Harness::new().await;
    harness.new_era(1).await;

    let err = harness.delegate(2, 9, 10).await.unwrap_err();
    assert!(matches!(err, HandlerError::IndexerNotFound(ref indexer) if *indexer == id(9)));

    let ctx = event_ctx((), harness.block(), 0);
    let exception = harness.get::<Exception>(&Exception::key(ctx.block_number, ctx.tx_hash)).await;
    let exception = exception.unwrap();
    assert_eq!(exception.handler, "handle_delegation_added");
    assert!(harness.get::<Delegation>(&pair_id(&id(2), &id(9))).await.is_none());
}

#[tokio::test]
async fn unregistering_unknown_indexer_is_recorded() {
    let mut harness = Harness::new().await;
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(IIndexerRegistry::UnregisterIndexer { indexer: addr(7) }, block, ts);

    let err = harness.handlers.handle_unregister_indexer(&ctx).await.unwrap_err();
    assert!(matches!(err, HandlerError::IndexerNotFound(_)));
    let exception = harness.get::<Exception>(&Exception::key(block, ctx.tx_hash)).await.unwrap();
    assert_eq!(exception.error, err.to_string());
}

#[tokio::test]
async fn first_commission_rate_is_instant() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;

    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IIndexerRegistry::SetCommissionRate { indexer: addr(1), amount: u(100) },
        block,
        ts,
    );
    harness.handlers.handle_set_commission_rate(&ctx).await.unwrap();
    let indexer = harness.get::<Indexer>(&id(1)).await.unwrap();
    assert_eq!(indexer.commission, EraValue { era: 1, value: u(100), value_after: u(100) });

    harness.new_era(2).await;
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IIndexerRegistry::SetCommissionRate { indexer: addr(1), amount: u(200) },
        block,
        ts,
    );
    harness.handlers.handle_set_commission_rate(&ctx).await.unwrap();
    let indexer = harness.get::<Indexer>(&id(1)).await.unwrap();
    assert_eq!(indexer.commission, EraValue { era: 2, value: u(100), value_after: u(200) });
}

#[tokio::test]
async fn unregistering_twice_is_an_illegal_transition() {
    let mut harness = Harness::new().await;
    harness.register(1).await;

    for expect_ok in [true, false] {
        let (block, ts) = harness.next_block();
        let ctx = event_ctx(IIndexerRegistry::UnregisterIndexer { indexer: addr(1) }, block, ts);
        let result = harness.handlers.handle_unregister_indexer(&ctx).await;
        assert_eq!(result.is_ok(), expect_ok, "{result:?}");
    }
}

#[tokio::test]
async fn failed_constant_lookup_leaves_delegation_unapplied() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;

    // the era is cached, the leverage limit still has to come from the chain
    harness.chain.fail_calls(true);
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IStaking::DelegationAdded { source: addr(1), runner: addr(1), amount: u(100) },
        block,
        ts,
    );
    let err = harness.handlers.handle_delegation_added(&ctx).await.unwrap_err();
    assert!(err.is_recoverable(), "{err:?}");
    assert!(harness.get::<IndexerStakeSummary>(&id(1)).await.is_none());
    assert!(harness.get::<Delegation>(&pair_id(&id(1), &id(1))).await.is_none());

    harness.chain.fail_calls(false);
    harness.handlers.handle_delegation_added(&ctx).await.unwrap();

    let summary = harness.get::<IndexerStakeSummary>(&id(1)).await.unwrap();
    assert_eq!(summary.total_stake, u(100));
    assert_eq!(summary.next_total_stake, u(100));
    let delegation = harness.get::<Delegation>(&pair_id(&id(1), &id(1))).await.unwrap();
    assert_eq!(delegation.amount, EraValue { era: 1, value: u(100), value_after: u(100) });
    let indexer = harness.get::<Indexer>(&id(1)).await.unwrap();
    assert_eq!(indexer.total_stake, EraValue { era: 1, value: u(100), value_after: u(100) });
    assert_eq!(fan_out(&harness, 1, 1).await.unwrap().delegators.total, u(100));
}

#[tokio::test]
async fn failed_constant_lookup_leaves_undelegation_unapplied() {
    let mut harness = Harness::new().await;
    harness.register(1).await;
    harness.new_era(1).await;
    harness.delegate(1, 1, 100).await.unwrap();
    harness.delegate(2, 1, 40).await.unwrap();

    // cached constants are dropped so the next handler has to read the chain
    for key in [CacheKey::IndexerLeverageLimit, CacheKey::MinimumStakingAmount] {
        harness.store.remove::<Cache>(key.as_str()).await.unwrap();
    }
    harness.chain.fail_calls(true);
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IStaking::DelegationRemoved { source: addr(2), runner: addr(1), amount: u(40) },
        block,
        ts,
    );
    assert!(harness.handlers.handle_delegation_removed(&ctx).await.unwrap_err().is_recoverable());

    harness.chain.fail_calls(false);
    harness.handlers.handle_delegation_removed(&ctx).await.unwrap();

    let summary = harness.get::<IndexerStakeSummary>(&id(1)).await.unwrap();
    assert_eq!(summary.next_total_stake, u(100));
    let delegation = harness.get::<Delegation>(&pair_id(&id(2), &id(1))).await.unwrap();
    assert_eq!(delegation.amount.value_after, U256::ZERO);
    assert_eq!(delegation.exit_era, Some(2));
}
