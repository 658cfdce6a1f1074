// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;
use test_case::test_case;
use test_strategy::proptest;

use super::{Address, AddressError, AddressFlags};

const CONTRACT: &str = "EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr";
const CONTRACT_HASH: &str = "39d031e7feac2cac0197ccbf13e873190ffee0f89999d1508fa05da410dcb24c";

fn contract() -> Address {
    Address::parse_raw(&format!("0:{CONTRACT_HASH}")).expect("Valid raw address")
}

/// Test that a bounceable user-friendly address is decoded into its parts.
#[test]
fn parses_friendly_address() {
    let (address, flags) = Address::parse_friendly(CONTRACT).expect("Valid address");

    assert_eq!(address.workchain, 0);
    assert_eq!(hex::encode(address.hash), CONTRACT_HASH);
    assert_eq!(flags, AddressFlags::default());
}

/// Test that the same account is encoded with the expected tag for each combination of flags.
#[test_case(true, false, "EQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTBSr"; "bounceable")]
#[test_case(false, false, "UQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTElu"; "non-bounceable")]
#[test_case(true, true, "kQA50DHn_qwsrAGXzL8T6HMZD_7g-JmZ0VCPoF2kENyyTK8h"; "bounceable test-only")]
fn encodes_flags(bounceable: bool, test_only: bool, expected: &str) {
    let flags = AddressFlags {
        bounceable,
        test_only,
    };

    assert_eq!(contract().to_friendly(flags), expected);

    let (address, parsed_flags) = Address::parse_friendly(expected).expect("Valid address");
    assert_eq!(address, contract());
    assert_eq!(parsed_flags, flags);
}

/// Test that the standard base64 alphabet is accepted as well.
#[test]
fn parses_standard_alphabet() {
    let standard = "EQA50DHn/qwsrAGXzL8T6HMZD/7g+JmZ0VCPoF2kENyyTBSr";

    assert_eq!(contract().to_friendly_standard(AddressFlags::default()), standard);
    assert_eq!(standard.parse::<Address>(), Ok(contract()));
}

/// Test that a corrupted character is detected by the checksum.
#[test]
fn rejects_corrupted_address() {
    let corrupted = CONTRACT.replacen("A50", "A51", 1);

    assert_eq!(
        Address::parse_friendly(&corrupted),
        Err(AddressError::ChecksumMismatch)
    );
}

#[test]
fn rejects_wrong_length() {
    assert_matches!(
        "EQA50DHn".parse::<Address>(),
        Err(AddressError::InvalidLength(8))
    );
}

#[test]
fn rejects_bad_raw_hash() {
    assert_eq!(
        Address::parse_raw("0:abcd"),
        Err(AddressError::InvalidHash)
    );
    assert_matches!(
        Address::parse_raw(&format!("300:{CONTRACT_HASH}")),
        Err(AddressError::InvalidWorkchain(_))
    );
}

#[test]
fn raw_form_keeps_negative_workchain() {
    let raw = format!("-1:{CONTRACT_HASH}");
    let address = raw.parse::<Address>().expect("Valid raw address");

    assert_eq!(address.workchain, -1);
    assert_eq!(address.to_raw(), raw);
}

#[test]
fn serializes_as_friendly_string() {
    let json = serde_json::to_string(&contract()).expect("Serialization should not fail");

    assert_eq!(json, format!("\"{CONTRACT}\""));
    assert_eq!(
        serde_json::from_str::<Address>(&json).expect("Deserialization should not fail"),
        contract()
    );
}

/// Test that any address survives being rendered in its user-friendly form.
#[proptest]
fn friendly_form_is_reversible(address: Address, bounceable: bool, test_only: bool) {
    let flags = AddressFlags {
        bounceable,
        test_only,
    };

    let parsed = Address::parse_friendly(&address.to_friendly(flags));

    assert_eq!(parsed, Ok((address, flags)));
}
