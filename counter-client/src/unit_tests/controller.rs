// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, time::Duration};

use counter_base::{Address, Tokens};
use num_bigint::BigInt;
use tokio::time::{sleep, Instant};

use super::{
    ControllerConfig, ControllerHandle, CounterController, BUSY_ALERT, NOT_CONNECTED_ALERT,
};
use crate::{
    state::CounterDisplay,
    test_utils::{MockChainReader, MockWallet},
};

const CONTRACT: &str = "EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr";

fn contract() -> Address {
    CONTRACT.parse().expect("Valid address")
}

fn account() -> Address {
    Address::new(0, [0xab; 32])
}

fn value(counter: i64) -> CounterDisplay {
    CounterDisplay::Value(BigInt::from(counter))
}

/// Starts a controller on its own task.
fn start(
    wallet: MockWallet,
    reader: MockChainReader,
) -> (Arc<MockWallet>, Arc<MockChainReader>, ControllerHandle) {
    start_with_config(ControllerConfig::new(contract()), wallet, reader)
}

fn start_with_config(
    config: ControllerConfig,
    wallet: MockWallet,
    reader: MockChainReader,
) -> (Arc<MockWallet>, Arc<MockChainReader>, ControllerHandle) {
    let wallet = Arc::new(wallet);
    let reader = Arc::new(reader);
    let (controller, handle) = CounterController::new(config, wallet.clone(), reader.clone());
    tokio::spawn(controller.run());
    (wallet, reader, handle)
}

#[test_log::test(tokio::test(start_paused = true))]
async fn counter_is_read_on_start() {
    let reader = MockChainReader::new();
    reader.set_counter(42);
    let (_wallet, reader, mut handle) = start(MockWallet::new(account()), reader);

    let state = handle
        .wait_for(|state| state.counter != CounterDisplay::Loading)
        .await
        .expect("Controller is running");

    assert_eq!(state.counter.to_string(), "42");
    assert_eq!(state.address, None);
    assert_eq!(reader.calls(), vec![(contract(), "get_counter".to_owned())]);
}

/// Test that a failed read replaces the previous value instead of keeping it.
#[test_log::test(tokio::test(start_paused = true))]
async fn failed_read_shows_an_error() {
    let reader = MockChainReader::new();
    reader.push_counter(7, Duration::ZERO);
    reader.push_failure("service unavailable", Duration::ZERO);
    let (_wallet, _reader, mut handle) = start(MockWallet::new(account()), reader);

    handle
        .wait_for(|state| state.counter == value(7))
        .await
        .expect("Controller is running");
    handle.refresh().expect("Controller is running");
    let state = handle
        .wait_for(|state| state.counter == CounterDisplay::Error)
        .await
        .expect("Controller is running");

    assert_eq!(state.counter.to_string(), "Error");
    assert!(handle.try_alert().is_none());
}

#[test_log::test(tokio::test(start_paused = true))]
async fn connecting_sets_the_address() {
    let (_wallet, _reader, mut handle) = start(MockWallet::new(account()), MockChainReader::new());
    assert_eq!(handle.view().address, None);

    handle.connect(None).expect("Controller is running");
    let state = handle
        .wait_for(|state| state.address.is_some())
        .await
        .expect("Controller is running");

    assert_eq!(state.address, Some(account()));
    assert!(state.can_submit());
}

#[test_log::test(tokio::test(start_paused = true))]
async fn failed_connection_raises_an_alert() {
    let (_wallet, _reader, mut handle) = start(MockWallet::default(), MockChainReader::new());

    handle.connect(None).expect("Controller is running");
    let alert = handle.next_alert().await.expect("An alert");

    assert_eq!(
        alert.message,
        "Wallet connection failed: no account to connect to"
    );
    assert_eq!(handle.view().address, None);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn adding_without_a_wallet_is_refused() {
    let (wallet, _reader, mut handle) = start(MockWallet::new(account()), MockChainReader::new());

    handle
        .add(Tokens::from_tokens(5))
        .expect("Controller is running");
    let alert = handle.next_alert().await.expect("An alert");

    assert_eq!(alert.message, NOT_CONNECTED_ALERT);
    assert!(wallet.sent().is_empty());
    assert!(!handle.view().pending);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn rejected_transaction_raises_an_alert() {
    let wallet = MockWallet::connected(account());
    wallet.reject_next("User declined");
    let (wallet, reader, mut handle) = start(wallet, MockChainReader::new());

    handle
        .add(Tokens::from_tokens(5))
        .expect("Controller is running");
    let alert = handle.next_alert().await.expect("An alert");

    assert!(alert.message.contains("User declined"));
    assert_eq!(alert.message, "Transaction failed: User declined");
    assert_eq!(wallet.sent().len(), 1);
    assert!(!handle.view().pending);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(reader.calls().len(), 1);
}

/// Test that an accepted transaction is followed by a read once the settle delay elapsed.
#[test_log::test(tokio::test(start_paused = true))]
async fn accepted_transaction_rereads_after_the_settle_delay() {
    let (wallet, reader, mut handle) =
        start(MockWallet::connected(account()), MockChainReader::new());
    handle
        .wait_for(|state| state.counter == value(0))
        .await
        .expect("Controller is running");
    reader.set_counter(5);

    let submitted_at = Instant::now();
    handle
        .add(Tokens::from_tokens(5))
        .expect("Controller is running");
    handle
        .wait_for(|state| state.pending)
        .await
        .expect("Controller is running");

    sleep(Duration::from_secs(4)).await;
    let state = handle.view();
    assert!(state.pending);
    assert!(!state.can_submit());
    assert_eq!(state.counter, value(0));
    assert_eq!(reader.calls().len(), 1);

    let state = handle
        .wait_for(|state| !state.pending && state.counter == value(5))
        .await
        .expect("Controller is running");
    assert!(submitted_at.elapsed() >= Duration::from_secs(5));
    assert!(state.can_submit());
    assert_eq!(reader.calls().len(), 2);

    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    let [message] = sent[0].messages.as_slice() else {
        panic!("Expected a single message, got {:?}", sent[0].messages);
    };
    assert_eq!(message.destination, contract());
    assert_eq!(message.amount, Tokens::from_tokens(5));
    assert_eq!(message.payload, "te6cckEBAQEAEgAAIH6HZO8AAAAAAAAAAAAAAAV9U2MQ");
    assert!(handle.try_alert().is_none());
}

#[test_log::test(tokio::test(start_paused = true))]
async fn second_add_while_pending_is_refused() {
    let wallet = MockWallet::connected(account()).with_send_delay(Duration::from_secs(1));
    let (wallet, _reader, mut handle) = start(wallet, MockChainReader::new());

    handle
        .add(Tokens::from_tokens(5))
        .expect("Controller is running");
    handle
        .wait_for(|state| state.pending)
        .await
        .expect("Controller is running");
    handle
        .add(Tokens::from_tokens(3))
        .expect("Controller is running");
    let alert = handle.next_alert().await.expect("An alert");
    assert_eq!(alert.message, BUSY_ALERT);

    handle
        .wait_for(|state| !state.pending)
        .await
        .expect("Controller is running");
    assert_eq!(wallet.sent().len(), 1);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn amount_out_of_range_is_refused() {
    let (wallet, _reader, mut handle) =
        start(MockWallet::connected(account()), MockChainReader::new());

    handle
        .add(Tokens::from_tokens(u64::from(u32::MAX) + 1))
        .expect("Controller is running");
    let alert = handle.next_alert().await.expect("An alert");

    assert!(alert.message.starts_with("Transaction failed: "));
    assert!(wallet.sent().is_empty());
    assert!(!handle.view().pending);
}

/// Test that a validity window past the end of time is clamped instead of stopping the
/// controller.
#[test_log::test(tokio::test(start_paused = true))]
async fn huge_validity_is_clamped() {
    let config = ControllerConfig {
        validity: Duration::from_secs(u64::MAX),
        ..ControllerConfig::new(contract())
    };
    let (wallet, reader, mut handle) =
        start_with_config(config, MockWallet::connected(account()), MockChainReader::new());

    handle
        .add(Tokens::from_tokens(5))
        .expect("Controller is running");
    handle
        .wait_for(|state| state.pending)
        .await
        .expect("Controller is running");
    handle
        .wait_for(|state| !state.pending)
        .await
        .expect("Controller is running");

    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].valid_until, u64::MAX);
    assert!(handle.try_alert().is_none());

    reader.set_counter(9);
    handle.refresh().expect("Controller is running");
    handle
        .wait_for(|state| state.counter == value(9))
        .await
        .expect("Controller is running");
}

/// Test that a read finishing after a more recent one doesn't overwrite it.
#[test_log::test(tokio::test(start_paused = true))]
async fn stale_read_is_discarded() {
    let reader = MockChainReader::new();
    reader.push_counter(1, Duration::from_secs(3));
    reader.push_counter(2, Duration::from_secs(1));
    let (_wallet, reader, mut handle) = start(MockWallet::new(account()), reader);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(reader.calls().len(), 1);
    handle.refresh().expect("Controller is running");

    handle
        .wait_for(|state| state.counter == value(2))
        .await
        .expect("Controller is running");
    sleep(Duration::from_secs(5)).await;

    assert_eq!(reader.calls().len(), 2);
    assert_eq!(handle.view().counter, value(2));
}

#[test_log::test(tokio::test(start_paused = true))]
async fn disconnecting_abandons_the_transaction() {
    let (_wallet, reader, mut handle) =
        start(MockWallet::connected(account()), MockChainReader::new());
    handle
        .wait_for(|state| state.counter == value(0))
        .await
        .expect("Controller is running");

    handle
        .add(Tokens::from_tokens(5))
        .expect("Controller is running");
    handle
        .wait_for(|state| state.pending)
        .await
        .expect("Controller is running");
    sleep(Duration::from_secs(1)).await;

    handle.disconnect().expect("Controller is running");
    let state = handle
        .wait_for(|state| state.address.is_none())
        .await
        .expect("Controller is running");
    assert!(!state.pending);
    assert_eq!(state.counter, value(0));

    sleep(Duration::from_secs(10)).await;
    assert_eq!(reader.calls().len(), 1);
    assert!(handle.try_alert().is_none());
}
