// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The wallet session: the connected account and the capability to sign and broadcast
//! transactions on its behalf.

use std::{fmt, sync::Mutex};

use async_trait::async_trait;
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine as _,
};
use counter_base::{Address, AddressFlags, Tokens};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info};

#[cfg(test)]
#[path = "unit_tests/wallet.rs"]
mod tests;

/// A message to be sent from the connected account.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct OutgoingMessage {
    /// The destination account.
    #[serde(rename = "address")]
    pub destination: Address,
    /// The native tokens attached to the message.
    #[serde(serialize_with = "serialize_nanotons")]
    pub amount: Tokens,
    /// The message body, as a base64 bag of cells.
    pub payload: String,
}

/// A request to sign and broadcast a transaction, in the shape wallets expect it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// The Unix time in seconds after which the transaction must not be broadcast.
    pub valid_until: u64,
    /// The messages to send.
    pub messages: Vec<OutgoingMessage>,
}

fn serialize_nanotons<S: Serializer>(amount: &Tokens, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&amount.nanotons().to_string())
}

/// Errors reported by a wallet session.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WalletError {
    /// The user declined the request or the wallet refused it.
    #[error("{0}")]
    Rejected(String),

    /// There is no connected account.
    #[error("wallet is not connected")]
    NotConnected,

    /// No account was given to connect to.
    #[error("no account to connect to")]
    NoAccount,

    /// The wallet can't handle the request.
    #[error("unsupported request: {0}")]
    Unsupported(String),

    /// The wallet could not be reached.
    #[error("wallet transport error: {0}")]
    Transport(String),
}

/// A session with a wallet.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Returns the connected account, if any.
    fn account(&self) -> Option<Address>;

    /// Connects an account. Wallets that let the user pick the account may ignore the
    /// `requested` one.
    async fn connect(&self, requested: Option<Address>) -> Result<Address, WalletError>;

    /// Disconnects the current account.
    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Asks the wallet to sign and broadcast a transaction.
    ///
    /// Returns once the wallet accepted the request, which doesn't mean the transaction has
    /// been included in a block.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<(), WalletError>;
}

/// A `ton://transfer` link, understood by wallet applications to prefill a transfer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferLink {
    destination: Address,
    amount: Tokens,
    body: String,
    expires_at: u64,
}

impl TransferLink {
    /// Creates the link for a single-message `request`.
    pub fn new(request: &TransactionRequest) -> Result<Self, WalletError> {
        let [message] = request.messages.as_slice() else {
            return Err(WalletError::Unsupported(format!(
                "transfer links carry exactly one message, got {}",
                request.messages.len()
            )));
        };
        let body = STANDARD
            .decode(&message.payload)
            .map(|boc| URL_SAFE.encode(boc))
            .map_err(|error| WalletError::Unsupported(format!("payload is not base64: {error}")))?;

        Ok(TransferLink {
            destination: message.destination,
            amount: message.amount,
            body,
            expires_at: request.valid_until,
        })
    }
}

impl fmt::Display for TransferLink {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "ton://transfer/{}?amount={}&bin={}&exp={}",
            self.destination,
            self.amount.nanotons(),
            self.body,
            self.expires_at
        )
    }
}

/// A function showing a [`TransferLink`] to the user.
pub type Presenter = Box<dyn Fn(&TransferLink) -> Result<(), WalletError> + Send + Sync>;

/// A wallet session that hands transactions over to an external wallet application through
/// [`TransferLink`]s.
///
/// The account is the one the user names when connecting; the signing happens in the wallet
/// application once the user opens the link.
pub struct DeeplinkWallet {
    account: Mutex<Option<Address>>,
    test_only: bool,
    presenter: Presenter,
}

impl DeeplinkWallet {
    /// Creates a disconnected [`DeeplinkWallet`] showing links with `presenter`.
    pub fn new(test_only: bool, presenter: Presenter) -> Self {
        DeeplinkWallet {
            account: Mutex::new(None),
            test_only,
            presenter,
        }
    }

    fn lock_account(&self) -> std::sync::MutexGuard<'_, Option<Address>> {
        self.account
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WalletSession for DeeplinkWallet {
    fn account(&self) -> Option<Address> {
        *self.lock_account()
    }

    async fn connect(&self, requested: Option<Address>) -> Result<Address, WalletError> {
        let account = requested.ok_or(WalletError::NoAccount)?;
        *self.lock_account() = Some(account);
        let flags = AddressFlags {
            bounceable: false,
            test_only: self.test_only,
        };
        info!(account = %account.to_friendly(flags), "Wallet connected");
        Ok(account)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.lock_account().take();
        info!("Wallet disconnected");
        Ok(())
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<(), WalletError> {
        if self.account().is_none() {
            return Err(WalletError::NotConnected);
        }
        let link = TransferLink::new(&request)?;
        debug!(%link, "Presenting transfer link");
        (self.presenter)(&link)
    }
}
