// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use counter_base::Address;
use counter_client::{CounterDisplay, Network, ViewState};
use num_bigint::BigInt;
use test_case::test_case;

use super::{
    render, shorten, wallet_label, ViewContext, CONNECT_LABEL, PROCESSING_LABEL, TITLE,
};

fn context() -> ViewContext {
    ViewContext {
        contract: "EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr"
            .parse()
            .expect("Valid address"),
        network: Network::Testnet,
    }
}

fn account() -> Address {
    Address::new(0, [0xab; 32])
}

#[test_case("EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr", 8, 6, "EQA50DHn...yyTBSr")]
#[test_case("0QCrq6urq6urq6urq6urq6urq6urq6urq6urq6urq6urqyNr", 6, 4, "0QCrq6...qyNr")]
#[test_case("short", 6, 4, "short"; "short text is kept")]
fn shortening(text: &str, head: usize, tail: usize, expected: &str) {
    assert_eq!(shorten(text, head, tail), expected);
}

#[test_case(Network::Testnet, "0QCrq6...qyNr")]
#[test_case(Network::Mainnet, "UQCrq6...q5jh")]
fn connected_wallet_is_shown_non_bounceable(network: Network, expected: &str) {
    assert_eq!(wallet_label(Some(&account()), network), expected);
}

#[test]
fn disconnected_panel_offers_to_connect() {
    let panel = render(&ViewState::default(), &context());

    assert!(panel.contains(TITLE));
    assert!(panel.contains(CONNECT_LABEL));
    assert!(panel.contains("Current Counter Value"));
    assert!(panel.contains("..."));
    assert!(panel.contains("Contract: EQA50DHn...yyTBSr"));
    assert!(panel.contains("Network: Testnet"));
    assert!(!panel.contains("Add 5 to Counter"));
}

#[test]
fn connected_panel_shows_the_buttons() {
    let state = ViewState::default()
        .connected(account())
        .counter_loaded(BigInt::from(42));

    let panel = render(&state, &context());

    assert!(panel.contains("0QCrq6...qyNr"));
    assert!(!panel.contains(CONNECT_LABEL));
    assert!(panel.contains("42"));
    assert!(panel.contains("Add 1 to Counter  [add 0.01]"));
    assert!(panel.contains("Add 5 to Counter  [add 5]"));
    assert!(panel.contains("Add 10 to Counter  [add 10]"));
    assert!(!panel.contains(PROCESSING_LABEL));
}

#[test]
fn pending_panel_disables_the_buttons() {
    let state = ViewState::default()
        .connected(account())
        .submission_started();

    let panel = render(&state, &context());

    assert_eq!(panel.matches(PROCESSING_LABEL).count(), 3);
    assert!(panel.contains("(disabled)"));
    assert!(!panel.contains("Add 5 to Counter"));
}

#[test]
fn failed_read_is_shown_as_an_error() {
    let state = ViewState::default()
        .counter_loaded(BigInt::from(7))
        .counter_failed();
    assert_eq!(state.counter, CounterDisplay::Error);

    let panel = render(&state, &context());

    assert!(panel.contains("Error"));
    assert!(!panel.contains('7'));
}
