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

use network_indexer::{
    contracts::IStaking,
    entities::{Exception, Withdrawal, WithdrawalStatus, WithdrawalType},
    test_utils::event_ctx,
    HandlerError,
};

use crate::common::{addr, id, u, Harness};

fn withdrawal_id(source: u8, index: u64) -> String {
    format!("{}:{index:#x}", id(source))
}

async fn request(harness: &mut Harness, index: u64, unbond_type: u8) -> Result<(), HandlerError> {
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IStaking::UnbondRequested {
            source: addr(2),
            runner: addr(1),
            amount: u(25),
            index: u(index),
            unbondType: unbond_type,
        },
        block,
        ts,
    );
    harness.handlers.handle_unbond_requested(&ctx).await
}

async fn withdraw(harness: &mut Harness, index: u64) -> Result<(), HandlerError> {
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IStaking::UnbondWithdrawn { source: addr(2), amount: u(25), fee: u(1), index: u(index) },
        block,
        ts,
    );
    harness.handlers.handle_unbond_withdrawn(&ctx).await
}

async fn cancel(harness: &mut Harness, index: u64) -> Result<(), HandlerError> {
    let (block, ts) = harness.next_block();
    let ctx = event_ctx(
        IStaking::UnbondCancelled {
            source: addr(2),
            runner: addr(1),
            amount: u(25),
            index: u(index),
        },
        block,
        ts,
    );
    harness.handlers.handle_unbond_cancelled(&ctx).await
}

#[tokio::test]
async fn requested_withdrawal_can_be_claimed_once() {
    let mut harness = Harness::new().await;
    request(&mut harness, 10, 1).await.unwrap();

    let withdrawal = harness.get::<Withdrawal>(&withdrawal_id(2, 10)).await.unwrap();
    assert_eq!(withdrawal.status, WithdrawalStatus::Ongoing);
    assert_eq!(withdrawal.kind, WithdrawalType::Unstake);
    assert_eq!(withdrawal.indexer, id(1));
    assert_eq!(withdrawal.amount, u(25));

    withdraw(&mut harness, 10).await.unwrap();
    let withdrawal = harness.get::<Withdrawal>(&withdrawal_id(2, 10)).await.unwrap();
    assert_eq!(withdrawal.status, WithdrawalStatus::Claimed);

    let err = cancel(&mut harness, 10).await.unwrap_err();
    assert!(matches!(err, HandlerError::IllegalTransition(_)), "{err:?}");
}

#[tokio::test]
async fn cancelled_withdrawal_cannot_be_claimed() {
    let mut harness = Harness::new().await;
    request(&mut harness, 0, 0).await.unwrap();
    cancel(&mut harness, 0).await.unwrap();

    let withdrawal = harness.get::<Withdrawal>(&withdrawal_id(2, 0)).await.unwrap();
    assert_eq!(withdrawal.status, WithdrawalStatus::Cancelled);
    assert!(withdraw(&mut harness, 0).await.is_err());
}

#[tokio::test]
async fn claim_before_request_is_recorded_and_skipped() {
    let mut harness = Harness::new().await;
    withdraw(&mut harness, 4).await.unwrap();

    let ctx = event_ctx((), harness.block(), 0);
    let exception = harness.get::<Exception>(&Exception::key(ctx.block_number, ctx.tx_hash)).await;
    assert_eq!(exception.unwrap().handler, "handle_unbond_withdrawn");
    assert!(harness.get::<Withdrawal>(&withdrawal_id(2, 4)).await.is_none());
}

#[tokio::test]
async fn cancelling_unknown_withdrawal_fails() {
    let mut harness = Harness::new().await;
    let err = cancel(&mut harness, 4).await.unwrap_err();
    assert!(matches!(err, HandlerError::MissingEntity { entity: "Withdrawal", .. }), "{err:?}");
}

#[tokio::test]
async fn unknown_unbond_type_is_rejected() {
    let mut harness = Harness::new().await;
    let err = request(&mut harness, 1, 9).await.unwrap_err();
    assert!(matches!(err, HandlerError::UnknownEnumValue { value: 9, .. }), "{err:?}");
    assert!(harness.get::<Withdrawal>(&withdrawal_id(2, 1)).await.is_none());
}
