// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use assert_matches::assert_matches;
use counter_base::Address;
use num_bigint::BigInt;
use test_case::test_case;

use super::{parse_number, read_counter, RpcError, Stack, StackEntry, COUNTER_GETTER};
use crate::test_utils::MockChainReader;

#[test_case("0x2a", 42; "hexadecimal")]
#[test_case("-0x2a", -42; "negative hexadecimal")]
#[test_case("42", 42; "decimal")]
#[test_case("-7", -7; "negative decimal")]
#[test_case("0x0", 0; "zero")]
fn numbers_are_parsed(input: &str, expected: i64) {
    assert_eq!(
        parse_number(input).expect("Valid number"),
        BigInt::from(expected)
    );
}

#[test_case(""; "empty")]
#[test_case("0x"; "prefix only")]
#[test_case("0xzz"; "invalid digits")]
#[test_case("forty-two"; "words")]
#[test_case("--5"; "double minus")]
#[test_case("-+5"; "minus plus")]
#[test_case("+0x5"; "plus hexadecimal")]
fn invalid_numbers_are_rejected(input: &str) {
    assert_matches!(parse_number(input), Err(RpcError::MalformedResponse(_)));
}

#[test]
fn numbers_beyond_64_bits_are_kept() {
    let value = parse_number("0x10000000000000000").expect("Valid number");

    assert_eq!(value, BigInt::from(u64::MAX) + 1);
}

#[test]
fn stack_is_read_from_the_top() {
    let mut stack: Stack = [
        StackEntry::Number(BigInt::from(1)),
        StackEntry::Null,
        StackEntry::Number(BigInt::from(3)),
    ]
    .into_iter()
    .collect();

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.read_number().expect("A number"), BigInt::from(1));
    assert_matches!(
        stack.read_number(),
        Err(RpcError::UnexpectedStackEntry { expected: "num", found }) if found == "null"
    );
    assert_eq!(stack.read_number().expect("A number"), BigInt::from(3));
    assert!(stack.is_empty());
    assert_matches!(stack.read(), Err(RpcError::StackExhausted));
}

#[tokio::test]
async fn counter_is_read_through_its_getter() {
    let contract = Address::new(0, [7; 32]);
    let reader = MockChainReader::new();
    reader.set_counter(42);

    let value = read_counter(&reader, &contract).await.expect("Read succeeds");

    assert_eq!(value, BigInt::from(42));
    assert_eq!(reader.calls(), vec![(contract, COUNTER_GETTER.to_owned())]);
}

#[tokio::test]
async fn counter_read_failures_are_propagated() {
    let reader = MockChainReader::new();
    reader.push_failure("rate limit exceeded", Duration::ZERO);

    let error = read_counter(&reader, &Address::new(0, [7; 32]))
        .await
        .expect_err("Read fails");

    assert_matches!(error, RpcError::Node { message, .. } if message == "rate limit exceeded");
}
