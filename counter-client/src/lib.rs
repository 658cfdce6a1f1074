// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides the client of a counter contract on the TON network: the encoding of
//! increment messages, reads of the counter through a node, wallet sessions and the
//! [`controller::CounterController`] tying them to a view state.

#![deny(missing_docs)]

pub mod config;
pub mod controller;
pub mod message;
pub mod rpc;
pub mod state;
pub mod timer;
pub mod toncenter;
pub mod wallet;

#[cfg(with_testing)]
pub mod test_utils;

pub use crate::{
    config::{ClientConfig, Network},
    controller::{Alert, ControllerConfig, ControllerHandle, CounterController},
    message::IncrementMessage,
    rpc::{read_counter, ChainReader},
    state::{CounterDisplay, ViewState},
    toncenter::TonCenterClient,
    wallet::{DeeplinkWallet, WalletSession},
};
