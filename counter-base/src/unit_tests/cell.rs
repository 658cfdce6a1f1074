// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;

use super::{Cell, CellBuilder, CellError, MAX_BITS};
use crate::crc::crc32c;

/// Test that the empty cell is serialized as the well-known eighteen-byte bag of cells.
#[test]
fn empty_cell_boc() {
    let boc = Cell::default().to_boc();

    assert_eq!(hex::encode(&boc), "b5ee9c724101010100020000004cacb9cd");
    assert_eq!(Cell::default().to_boc_base64(), "te6cckEBAQEAAgAAAEysuc0=");
}

#[test]
fn stores_fields_big_endian() {
    let cell = CellBuilder::new()
        .store_uint(0x7e87_64ef, 32)
        .and_then(|builder| builder.store_uint(0, 64))
        .and_then(|builder| builder.store_uint(5, 32))
        .expect("Fields fit in a cell")
        .build();

    assert_eq!(cell.bits(), 128);
    assert_eq!(
        hex::encode(cell.data()),
        "7e8764ef000000000000000000000005"
    );
    assert_eq!(
        hex::encode(cell.to_boc()),
        "b5ee9c724101010100120000207e8764ef0000000000000000000000057d536310"
    );
}

/// Test that a cell with an incomplete last byte carries the completion tag.
#[test]
fn partial_byte_gets_completion_tag() {
    let mut builder = CellBuilder::new();
    builder.store_uint(0b1010, 4).expect("Four bits fit");
    let cell = builder.build();

    assert_eq!(cell.data(), [0xa0]);
    assert_eq!(cell.serialize_with_refs(&[], 1), [0x00, 0x01, 0xa8]);
}

#[test]
fn references_point_forward() {
    let mut builder = CellBuilder::new();
    builder
        .store_uint(0xff, 8)
        .and_then(|builder| builder.store_ref(Cell::default()))
        .expect("A byte and one reference fit");
    let boc = builder.build().to_boc();

    let (contents, checksum) = boc.split_at(boc.len() - 4);
    assert_eq!(
        hex::encode(contents),
        "b5ee9c72410102010006000102ff010000"
    );
    assert_eq!(checksum, crc32c(contents).to_le_bytes());
}

#[test]
fn rejects_values_wider_than_the_field() {
    assert_matches!(
        CellBuilder::new().store_uint(256, 8),
        Err(CellError::ValueOutOfRange { value: 256, bits: 8 })
    );
    assert!(CellBuilder::new().store_uint(u64::MAX, 64).is_ok());
}

#[test]
fn rejects_data_past_capacity() {
    let mut builder = CellBuilder::new();
    for _ in 0..MAX_BITS {
        builder.store_bit(true).expect("Capacity not reached yet");
    }

    assert_eq!(builder.available_bits(), 0);
    assert_matches!(
        builder.store_bit(false),
        Err(CellError::BitsOverflow { stored: 1023, requested: 1 })
    );
}

#[test]
fn rejects_a_fifth_reference() {
    let mut builder = CellBuilder::new();
    for _ in 0..4 {
        builder.store_ref(Cell::default()).expect("Four references fit");
    }

    assert_matches!(
        builder.store_ref(Cell::default()),
        Err(CellError::RefsOverflow)
    );
}
