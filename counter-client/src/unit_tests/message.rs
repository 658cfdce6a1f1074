// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use counter_base::Tokens;
use test_case::test_case;
use test_strategy::proptest;

use super::{IncrementMessage, MessageError, ADD_OPCODE};

/// Test that a fractional amount is truncated to zero in the amount field.
#[test]
fn fractional_amount_truncates_to_zero() {
    let amount = "0.01".parse::<Tokens>().expect("Valid amount");
    let message = IncrementMessage::new(amount).expect("Amount fits");

    assert_eq!(message.amount, 0);
    assert_eq!(
        hex::encode(message.to_cell().expect("Message fits in a cell").data()),
        "7e8764ef000000000000000000000000"
    );
}

#[test_case(0, "te6cckEBAQEAEgAAIH6HZO8AAAAAAAAAAAAAAABhR5Il"; "zero")]
#[test_case(5, "te6cckEBAQEAEgAAIH6HZO8AAAAAAAAAAAAAAAV9U2MQ"; "five")]
#[test_case(10, "te6cckEBAQEAEgAAIH6HZO8AAAAAAAAAAAAAAApZb3BO"; "ten")]
fn payload_is_base64_bag_of_cells(tokens: u64, expected: &str) {
    let message = IncrementMessage::new(Tokens::from_tokens(tokens)).expect("Amount fits");

    assert_eq!(message.to_payload(), Ok(expected.to_owned()));
}

#[test]
fn rejects_amounts_wider_than_the_field() {
    let amount = Tokens::from_tokens(u64::from(u32::MAX) + 1);

    assert_eq!(
        IncrementMessage::new(amount),
        Err(MessageError::AmountOutOfRange(amount))
    );
    assert!(IncrementMessage::new(Tokens::from_tokens(u32::MAX.into())).is_ok());
}

#[test]
fn opcode_can_be_overridden() {
    let message = IncrementMessage::new(Tokens::from_tokens(1))
        .expect("Amount fits")
        .with_opcode(0x0000_0001);
    let cell = message.to_cell().expect("Message fits in a cell");

    assert_eq!(&cell.data()[..4], [0, 0, 0, 1]);
    assert_eq!(cell.data()[15], 1);
}

/// Test that the opcode leads and the query identifier is zero for any amount that fits.
#[proptest]
fn header_is_fixed(#[strategy(1u64..=u64::from(u32::MAX))] tokens: u64) {
    let message = IncrementMessage::new(Tokens::from_tokens(tokens)).expect("Amount fits");
    let cell = message.to_cell().expect("Message fits in a cell");
    let data = cell.data();

    assert_eq!(cell.bits(), 128);
    assert_eq!(data[..4], ADD_OPCODE.to_be_bytes());
    assert_eq!(data[4..12], [0u8; 8]);
    assert_eq!(data[12..], (tokens as u32).to_be_bytes());
}
