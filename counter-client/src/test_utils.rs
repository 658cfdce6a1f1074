// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scripted implementations of the collaborators, for tests.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use counter_base::Address;
use num_bigint::BigInt;
use tokio::time::sleep;

use crate::{
    rpc::{ChainReader, RpcError, Stack, StackEntry},
    wallet::{TransactionRequest, WalletError, WalletSession},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("Mocks never panic while holding a lock")
}

/// A scripted answer of the [`MockChainReader`].
#[derive(Clone, Debug)]
enum ScriptedRead {
    Counter(BigInt),
    Failure(String),
}

/// A [`ChainReader`] answering from a script, then with a fixed counter value.
#[derive(Debug, Default)]
pub struct MockChainReader {
    script: Mutex<VecDeque<(Duration, ScriptedRead)>>,
    counter: Mutex<BigInt>,
    calls: Mutex<Vec<(Address, String)>>,
}

impl MockChainReader {
    /// Creates a reader answering with a counter of zero.
    pub fn new() -> Self {
        MockChainReader::default()
    }

    /// Sets the counter value returned once the script is exhausted.
    pub fn set_counter(&self, value: impl Into<BigInt>) {
        *lock(&self.counter) = value.into();
    }

    /// Makes a future call return `value` after `delay`.
    pub fn push_counter(&self, value: impl Into<BigInt>, delay: Duration) {
        lock(&self.script).push_back((delay, ScriptedRead::Counter(value.into())));
    }

    /// Makes a future call fail with `message` after `delay`.
    pub fn push_failure(&self, message: impl Into<String>, delay: Duration) {
        lock(&self.script).push_back((delay, ScriptedRead::Failure(message.into())));
    }

    /// Returns the contracts and get-methods called so far.
    pub fn calls(&self) -> Vec<(Address, String)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn run_get_method(
        &self,
        address: &Address,
        method: &str,
        _stack: &[StackEntry],
    ) -> Result<Stack, RpcError> {
        lock(&self.calls).push((*address, method.to_owned()));
        let scripted = lock(&self.script).pop_front();
        let answer = match scripted {
            Some((delay, answer)) => {
                sleep(delay).await;
                answer
            }
            None => {
                let value = lock(&self.counter).clone();
                ScriptedRead::Counter(value)
            }
        };
        match answer {
            ScriptedRead::Counter(value) => Ok([StackEntry::Number(value)].into_iter().collect()),
            ScriptedRead::Failure(message) => Err(RpcError::Node {
                code: None,
                message,
            }),
        }
    }
}

/// A [`WalletSession`] accepting or rejecting transactions from a script and recording them.
#[derive(Debug, Default)]
pub struct MockWallet {
    account: Mutex<Option<Address>>,
    default_account: Option<Address>,
    script: Mutex<VecDeque<Result<(), WalletError>>>,
    send_delay: Duration,
    sent: Mutex<Vec<TransactionRequest>>,
}

impl MockWallet {
    /// Creates a disconnected wallet that connects to `account` when no account is requested.
    pub fn new(default_account: Address) -> Self {
        MockWallet {
            default_account: Some(default_account),
            ..MockWallet::default()
        }
    }

    /// Creates a wallet already connected to `account`.
    pub fn connected(account: Address) -> Self {
        MockWallet {
            account: Mutex::new(Some(account)),
            ..MockWallet::new(account)
        }
    }

    /// Makes the wallet take `delay` to answer each transaction.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Makes the next transaction be rejected with `message`.
    pub fn reject_next(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Err(WalletError::Rejected(message.into())));
    }

    /// Returns the transactions the wallet was asked to send.
    pub fn sent(&self) -> Vec<TransactionRequest> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    fn account(&self) -> Option<Address> {
        *lock(&self.account)
    }

    async fn connect(&self, requested: Option<Address>) -> Result<Address, WalletError> {
        let account = requested
            .or(self.default_account)
            .ok_or(WalletError::NoAccount)?;
        *lock(&self.account) = Some(account);
        Ok(account)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        lock(&self.account).take();
        Ok(())
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<(), WalletError> {
        if self.account().is_none() {
            return Err(WalletError::NotConnected);
        }
        lock(&self.sent).push(request);
        sleep(self.send_delay).await;
        lock(&self.script).pop_front().unwrap_or(Ok(()))
    }
}
