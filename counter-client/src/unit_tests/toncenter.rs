// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use assert_matches::assert_matches;
use num_bigint::BigInt;
use serde_json::{json, Value};

use super::{
    encode_argument, parse_run_result, JsonRpcRequest, JsonRpcResponse, TonCenterClient,
    TESTNET_ENDPOINT,
};
use crate::rpc::{RpcError, StackEntry};

const CONTRACT: &str = "EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr";

fn client(api_key: Option<&str>) -> TonCenterClient {
    TonCenterClient::new(
        TESTNET_ENDPOINT,
        api_key.map(str::to_owned),
        Duration::from_secs(10),
    )
    .expect("Client can be built")
}

fn get_counter_request() -> JsonRpcRequest<'static> {
    JsonRpcRequest::run_get_method(CONTRACT, "get_counter", &[]).expect("No arguments")
}

#[test]
fn get_method_request_has_the_json_rpc_shape() {
    let body = serde_json::to_value(get_counter_request()).expect("Serializable request");

    assert_eq!(
        body,
        json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": "runGetMethod",
            "params": {
                "address": CONTRACT,
                "method": "get_counter",
                "stack": [],
            },
        })
    );
}

#[test]
fn api_key_is_sent_in_its_header() {
    let request = client(Some("secret"))
        .post(&get_counter_request())
        .build()
        .expect("Valid request");

    assert_eq!(request.method(), reqwest::Method::POST);
    assert_eq!(request.url().as_str(), TESTNET_ENDPOINT);
    assert_eq!(
        request
            .headers()
            .get("x-api-key")
            .and_then(|value| value.to_str().ok()),
        Some("secret")
    );
    let body = request
        .body()
        .and_then(|body| body.as_bytes())
        .expect("Buffered body");
    let body = serde_json::from_slice::<Value>(body).expect("JSON body");
    assert_eq!(body["params"]["method"], "get_counter");
}

#[test]
fn api_key_header_is_omitted_without_a_key() {
    let request = client(None)
        .post(&get_counter_request())
        .build()
        .expect("Valid request");

    assert!(request.headers().get("x-api-key").is_none());
}

/// Test that exit code 1, the alternative success code, is accepted.
#[test]
fn alternative_success_exit_code_is_accepted() {
    let result = json!({"stack": [["num", "0x5"]], "exit_code": 1});

    let mut stack = parse_run_result("get_counter", result).expect("Successful run");

    assert_eq!(stack.read_number().expect("Number entry"), BigInt::from(5));
}

/// Test that a successful run with a numeric result is turned into a stack.
#[test]
fn parses_numeric_stack() {
    let result = json!({
        "@type": "smc.runResult",
        "gas_used": 505,
        "stack": [["num", "0x2a"], ["num", "-0x1"]],
        "exit_code": 0,
    });

    let mut stack = parse_run_result("get_counter", result).expect("Valid result");

    assert_eq!(stack.len(), 2);
    assert_eq!(stack.read_number().expect("Number entry"), BigInt::from(42));
    assert_eq!(stack.read_number().expect("Number entry"), BigInt::from(-1));
    assert!(stack.is_empty());
}

#[test]
fn keeps_cells_and_unknown_entries() {
    let result = json!({
        "stack": [
            ["cell", {"bytes": "te6cckEBAQEAAgAAAEysuc0=", "object": {}}],
            ["tuple", {"elements": []}],
        ],
        "exit_code": 0,
    });

    let mut stack = parse_run_result("get_data", result).expect("Valid result");

    assert_eq!(
        stack.read().expect("Cell entry"),
        StackEntry::Cell("te6cckEBAQEAAgAAAEysuc0=".to_owned())
    );
    assert_matches!(
        stack.read().expect("Tuple entry"),
        StackEntry::Other { kind, .. } if kind == "tuple"
    );
}

/// Test that a missing get-method surfaces as a failed exit code.
#[test]
fn reports_failed_exit_code() {
    let result = json!({"stack": [], "exit_code": 11});

    assert_matches!(
        parse_run_result("get_counter", result),
        Err(RpcError::ExitCode { method, exit_code: 11 }) if method == "get_counter"
    );
}

#[test]
fn rejects_non_string_numbers() {
    let result = json!({"stack": [["num", 42]], "exit_code": 0});

    assert_matches!(
        parse_run_result("get_counter", result),
        Err(RpcError::MalformedResponse(_))
    );
}

#[test]
fn node_errors_keep_their_message() {
    let response = serde_json::from_value::<JsonRpcResponse>(json!({
        "ok": false,
        "error": "Ratelimit exceed",
        "code": 429,
    }))
    .expect("Valid response");

    assert_matches!(
        response.into_result(),
        Err(RpcError::Node { code: Some(429), message }) if message == "Ratelimit exceed"
    );
}

#[test]
fn encodes_arguments() {
    assert_eq!(
        encode_argument(&StackEntry::Number(BigInt::from(7))).expect("Numbers are supported"),
        json!(["num", "7"])
    );
    assert_matches!(
        encode_argument(&StackEntry::Null),
        Err(RpcError::UnsupportedArgument(kind)) if kind == "null"
    );
}
