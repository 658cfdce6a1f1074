// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use test_case::test_case;
use test_strategy::proptest;

use super::{AmountError, Tokens};

#[test_case("5", 5_000_000_000; "whole tokens")]
#[test_case("0.01", 10_000_000; "fraction")]
#[test_case(".5", 500_000_000; "no whole part")]
#[test_case("10.", 10_000_000_000; "trailing point")]
#[test_case("0.000000001", 1; "one nanoton")]
#[test_case(" 2.5 ", 2_500_000_000; "surrounding whitespace")]
fn parses_decimal_amounts(input: &str, nanotons: u128) {
    assert_eq!(input.parse::<Tokens>(), Ok(Tokens::from_nanotons(nanotons)));
}

#[test_case(""; "empty")]
#[test_case("."; "lone point")]
#[test_case("-1"; "negative")]
#[test_case("1e9"; "exponent")]
#[test_case("1.2.3"; "two points")]
fn rejects_malformed_amounts(input: &str) {
    assert_eq!(
        input.parse::<Tokens>(),
        Err(AmountError::Invalid(input.to_owned()))
    );
}

#[test]
fn rejects_sub_nanoton_precision() {
    assert_eq!(
        "0.0000000001".parse::<Tokens>(),
        Err(AmountError::TooPrecise("0.0000000001".to_owned()))
    );
}

#[test]
fn rejects_overflowing_amounts() {
    let huge = u128::MAX.to_string();

    assert_eq!(huge.parse::<Tokens>(), Err(AmountError::Overflow(huge)));
}

#[test]
fn whole_tokens_truncate_the_fraction() {
    assert_eq!(Tokens::from_nanotons(10_000_000).whole_tokens(), 0);
    assert_eq!(Tokens::from_nanotons(5_999_999_999).whole_tokens(), 5);
    assert_eq!(Tokens::from_tokens(10).whole_tokens(), 10);
}

#[test_case(Tokens::from_tokens(5), "5")]
#[test_case(Tokens::from_nanotons(10_000_000), "0.01")]
#[test_case(Tokens::from_nanotons(1_500_000_001), "1.500000001")]
#[test_case(Tokens::ZERO, "0")]
fn displays_without_trailing_zeros(amount: Tokens, expected: &str) {
    assert_eq!(amount.to_string(), expected);
}

/// Test that every amount can be parsed back from its decimal rendering.
#[proptest]
fn display_is_parseable(amount: Tokens) {
    assert_eq!(amount.to_string().parse::<Tokens>(), Ok(amount));
}
