// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use counter_base::{Address, Tokens};
use serde_json::json;

use super::{
    DeeplinkWallet, OutgoingMessage, TransactionRequest, TransferLink, WalletError,
    WalletSession,
};

const CONTRACT: &str = "EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr";
const PAYLOAD: &str = "te6cckEBAQEAEgAAIH6HZO8AAAAAAAAAAAAAAAV9U2MQ";

fn request() -> TransactionRequest {
    TransactionRequest {
        valid_until: 1_700_000_600,
        messages: vec![OutgoingMessage {
            destination: CONTRACT.parse().expect("Valid address"),
            amount: Tokens::from_tokens(5),
            payload: PAYLOAD.to_owned(),
        }],
    }
}

/// Test that requests are serialized in the shape wallets expect.
#[test]
fn request_serializes_like_a_wallet_request() {
    let json = serde_json::to_value(request()).expect("Serialization should not fail");

    assert_eq!(
        json,
        json!({
            "validUntil": 1_700_000_600,
            "messages": [{
                "address": CONTRACT,
                "amount": "5000000000",
                "payload": PAYLOAD,
            }],
        })
    );
}

#[test]
fn transfer_link_carries_the_whole_request() {
    let link = TransferLink::new(&request()).expect("Single message request");

    assert_eq!(
        link.to_string(),
        format!("ton://transfer/{CONTRACT}?amount=5000000000&bin={PAYLOAD}&exp=1700000600")
    );
}

#[test]
fn transfer_link_uses_url_safe_body() {
    let mut request = request();
    request.messages[0].payload = "+/8=".to_owned();

    let link = TransferLink::new(&request).expect("Single message request");

    assert!(link.to_string().contains("&bin=-_8=&"));
}

#[test]
fn transfer_link_needs_exactly_one_message() {
    let mut request = request();
    request.messages.push(request.messages[0].clone());

    assert_matches!(
        TransferLink::new(&request),
        Err(WalletError::Unsupported(_))
    );
}

#[tokio::test]
async fn deeplink_wallet_presents_links_once_connected() {
    let presented = Arc::new(Mutex::new(Vec::new()));
    let wallet = DeeplinkWallet::new(true, {
        let presented = presented.clone();
        Box::new(move |link: &TransferLink| {
            presented.lock().expect("Lock is never poisoned").push(link.to_string());
            Ok(())
        })
    });

    assert_eq!(
        wallet.send_transaction(request()).await,
        Err(WalletError::NotConnected)
    );
    assert_eq!(wallet.connect(None).await, Err(WalletError::NoAccount));

    let account: Address = CONTRACT.parse().expect("Valid address");
    assert_eq!(wallet.connect(Some(account)).await, Ok(account));
    assert_eq!(wallet.account(), Some(account));

    wallet
        .send_transaction(request())
        .await
        .expect("Presenting the link should succeed");
    assert_eq!(presented.lock().expect("Lock is never poisoned").len(), 1);

    wallet.disconnect().await.expect("Disconnecting should succeed");
    assert_eq!(wallet.account(), None);
}
