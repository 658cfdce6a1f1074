// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use counter_base::Address;
use num_bigint::BigInt;

use super::{CounterDisplay, ViewState};

fn account() -> Address {
    Address::new(0, [7; 32])
}

#[test]
fn counter_renders_as_decimal() {
    assert_eq!(CounterDisplay::Loading.to_string(), "...");
    assert_eq!(CounterDisplay::Value(BigInt::from(42)).to_string(), "42");
    assert_eq!(CounterDisplay::Error.to_string(), "Error");

    let huge = "123456789012345678901234567890".parse::<BigInt>().expect("Valid integer");
    assert_eq!(
        CounterDisplay::Value(huge).to_string(),
        "123456789012345678901234567890"
    );
}

/// Test that a failed read replaces the previous value with the sentinel.
#[test]
fn failed_read_discards_previous_value() {
    let state = ViewState::default()
        .counter_loaded(BigInt::from(41))
        .counter_failed();

    assert_eq!(state.counter, CounterDisplay::Error);
}

#[test]
fn submission_needs_an_idle_connected_account() {
    let disconnected = ViewState::default();
    assert!(!disconnected.can_submit());

    let connected = disconnected.connected(account());
    assert!(connected.can_submit());

    let pending = connected.submission_started();
    assert!(pending.pending);
    assert!(!pending.can_submit());

    let settled = pending.submission_finished();
    assert!(settled.can_submit());
}

#[test]
fn disconnecting_clears_the_pending_flag() {
    let state = ViewState::default()
        .connected(account())
        .counter_loaded(BigInt::from(3))
        .submission_started()
        .disconnected();

    assert_eq!(
        state,
        ViewState {
            address: None,
            counter: CounterDisplay::Value(BigInt::from(3)),
            pending: false,
        }
    );
}
