// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Drives a controller backed by a [`DeeplinkWallet`] through a full increment.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use counter_base::{Address, Tokens};
use counter_client::{
    controller::ControllerConfig,
    test_utils::MockChainReader,
    wallet::{TransferLink, WalletError},
    CounterController, CounterDisplay, DeeplinkWallet,
};
use num_bigint::BigInt;

const CONTRACT: &str = "EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr";
const USER: &str = "0:ab00000000000000000000000000000000000000000000000000000000000000";

#[test_log::test(tokio::test(start_paused = true))]
async fn increment_is_presented_as_a_transfer_link() {
    let contract: Address = CONTRACT.parse().expect("Valid address");
    let links = Arc::new(Mutex::new(Vec::new()));
    let presented = links.clone();
    let wallet = Arc::new(DeeplinkWallet::new(
        true,
        Box::new(move |link: &TransferLink| {
            presented
                .lock()
                .map_err(|_| WalletError::Transport("poisoned".to_owned()))?
                .push(link.to_string());
            Ok(())
        }),
    ));
    let reader = Arc::new(MockChainReader::new());
    reader.set_counter(10);

    let mut config = ControllerConfig::new(contract);
    config.settle_delay = Duration::from_secs(2);
    let (controller, mut handle) = CounterController::new(config, wallet, reader.clone());
    tokio::spawn(controller.run());

    handle
        .connect(Some(USER.parse().expect("Valid address")))
        .expect("Controller is running");
    handle
        .wait_for(|state| state.address.is_some() && state.counter != CounterDisplay::Loading)
        .await
        .expect("Controller is running");

    reader.set_counter(15);
    handle
        .add("5".parse::<Tokens>().expect("Valid amount"))
        .expect("Controller is running");
    handle
        .wait_for(|state| state.pending)
        .await
        .expect("Controller is running");
    let state = handle
        .wait_for(|state| {
            !state.pending && state.counter == CounterDisplay::Value(BigInt::from(15))
        })
        .await
        .expect("Controller is running");
    assert_eq!(state.counter.to_string(), "15");

    let links = links.lock().expect("Not poisoned").clone();
    assert_eq!(links.len(), 1);
    assert!(links[0].starts_with(&format!("ton://transfer/{CONTRACT}?amount=5000000000&bin=")));
    assert!(links[0].contains("&exp="));
    assert!(handle.try_alert().is_none());
}
