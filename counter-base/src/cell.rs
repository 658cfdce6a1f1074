// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Cells, the unit of serialized data on the TON network, and their transport encoding as a
//! *bag of cells*.
//!
//! A cell holds up to 1023 bits of data and up to four references to other cells. Message
//! payloads are built with a [`CellBuilder`] and sent as a bag of cells, usually encoded as
//! base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::{crc::crc32c, ensure};

#[cfg(test)]
#[path = "unit_tests/cell.rs"]
mod tests;

/// The maximum number of data bits in a cell.
pub const MAX_BITS: usize = 1023;
/// The maximum number of references in a cell.
pub const MAX_REFS: usize = 4;

/// The magic prefix of a serialized bag of cells.
const BOC_MAGIC: u32 = 0xb5ee_9c72;
/// The flag of the bag of cells header announcing a trailing CRC-32C checksum.
const BOC_HAS_CRC32C: u8 = 0x40;

/// Errors when building a [`Cell`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum CellError {
    /// Storing more data would exceed the capacity of the cell.
    #[error("cell overflow: cannot store {requested} more bits after {stored} bits")]
    BitsOverflow {
        /// The bits already stored.
        stored: usize,
        /// The bits that were requested to be stored.
        requested: usize,
    },

    /// Storing another reference would exceed the capacity of the cell.
    #[error("cell overflow: cannot store more than {MAX_REFS} references")]
    RefsOverflow,

    /// The value needs more bits than the field it is stored in.
    #[error("value {value} does not fit in {bits} bits")]
    ValueOutOfRange {
        /// The value to store.
        value: u64,
        /// The size of the field.
        bits: usize,
    },
}

/// An immutable cell.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Cell {
    data: Vec<u8>,
    bits: usize,
    refs: Vec<Cell>,
}

impl Cell {
    /// Returns the data bits of the cell, padded with zeros to a whole number of bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of data bits in the cell.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Returns the cells referenced by this cell.
    pub fn refs(&self) -> &[Cell] {
        &self.refs
    }

    /// Serializes the tree rooted at this cell as a bag of cells with a CRC-32C checksum and
    /// without an index.
    pub fn to_boc(&self) -> Vec<u8> {
        let mut cells = Vec::new();
        index_cells(self, &mut cells);

        let size_bytes = bytes_needed(cells.len() as u64);
        let serialized = cells
            .iter()
            .map(|(cell, refs)| cell.serialize_with_refs(refs, size_bytes))
            .collect::<Vec<_>>();
        let total_size = serialized.iter().map(Vec::len).sum::<usize>() as u64;
        let offset_bytes = bytes_needed(total_size);

        let mut boc = Vec::with_capacity(16 + total_size as usize);
        boc.extend_from_slice(&BOC_MAGIC.to_be_bytes());
        boc.push(BOC_HAS_CRC32C | size_bytes as u8);
        boc.push(offset_bytes as u8);
        push_sized(&mut boc, cells.len() as u64, size_bytes);
        // One root, no absent cells.
        push_sized(&mut boc, 1, size_bytes);
        push_sized(&mut boc, 0, size_bytes);
        push_sized(&mut boc, total_size, offset_bytes);
        push_sized(&mut boc, 0, size_bytes);
        for cell in serialized {
            boc.extend(cell);
        }

        let checksum = crc32c(&boc);
        boc.extend_from_slice(&checksum.to_le_bytes());
        boc
    }

    /// Serializes the tree rooted at this cell as a bag of cells encoded in base64.
    pub fn to_boc_base64(&self) -> String {
        STANDARD.encode(self.to_boc())
    }

    /// Serializes this cell's descriptors and data, pointing to its references at the given
    /// indices.
    fn serialize_with_refs(&self, refs: &[usize], size_bytes: usize) -> Vec<u8> {
        let full_bytes = self.bits / 8;
        let padded_bytes = self.bits.div_ceil(8);

        let mut bytes = Vec::with_capacity(2 + padded_bytes + refs.len() * size_bytes);
        bytes.push(self.refs.len() as u8);
        bytes.push((full_bytes + padded_bytes) as u8);
        bytes.extend_from_slice(&self.data);
        if self.bits % 8 != 0 {
            // Completion tag: a single set bit right after the data.
            let last = bytes.len() - 1;
            bytes[last] |= 0x80 >> (self.bits % 8);
        }
        for index in refs {
            push_sized(&mut bytes, *index as u64, size_bytes);
        }
        bytes
    }
}

/// Assigns indices to the cells of the tree in pre-order, so that every reference points
/// to a cell with a higher index.
fn index_cells<'cell>(cell: &'cell Cell, cells: &mut Vec<(&'cell Cell, Vec<usize>)>) -> usize {
    let index = cells.len();
    cells.push((cell, Vec::new()));
    let refs = cell
        .refs
        .iter()
        .map(|child| index_cells(child, cells))
        .collect();
    cells[index].1 = refs;
    index
}

/// The number of bytes needed to represent `value`, at least one.
fn bytes_needed(value: u64) -> usize {
    let bits = u64::BITS - value.leading_zeros();
    (bits as usize).div_ceil(8).max(1)
}

/// Appends the `size` least significant bytes of `value` in big-endian order.
fn push_sized(buffer: &mut Vec<u8>, value: u64, size: usize) {
    buffer.extend_from_slice(&value.to_be_bytes()[8 - size..]);
}

/// A builder of [`Cell`]s, storing fields bit by bit.
#[derive(Clone, Debug, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bits: usize,
    refs: Vec<Cell>,
}

impl CellBuilder {
    /// Creates an empty [`CellBuilder`].
    pub fn new() -> Self {
        CellBuilder::default()
    }

    /// Returns the number of bits still available.
    pub fn available_bits(&self) -> usize {
        MAX_BITS - self.bits
    }

    /// Stores a single bit.
    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, CellError> {
        ensure!(
            self.available_bits() >= 1,
            CellError::BitsOverflow {
                stored: self.bits,
                requested: 1,
            }
        );
        if self.bits % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            let last = self.data.len() - 1;
            self.data[last] |= 0x80 >> (self.bits % 8);
        }
        self.bits += 1;
        Ok(self)
    }

    /// Stores `value` as an unsigned big-endian integer of `bits` bits.
    pub fn store_uint(&mut self, value: u64, bits: usize) -> Result<&mut Self, CellError> {
        ensure!(
            bits <= 64 && (bits == 64 || value >> bits == 0),
            CellError::ValueOutOfRange { value, bits }
        );
        ensure!(
            self.available_bits() >= bits,
            CellError::BitsOverflow {
                stored: self.bits,
                requested: bits,
            }
        );
        for position in (0..bits).rev() {
            self.store_bit((value >> position) & 1 == 1)?;
        }
        Ok(self)
    }

    /// Stores whole bytes.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CellError> {
        ensure!(
            self.available_bits() >= bytes.len() * 8,
            CellError::BitsOverflow {
                stored: self.bits,
                requested: bytes.len() * 8,
            }
        );
        for byte in bytes {
            self.store_uint(u64::from(*byte), 8)?;
        }
        Ok(self)
    }

    /// Stores a reference to another cell.
    pub fn store_ref(&mut self, cell: Cell) -> Result<&mut Self, CellError> {
        ensure!(self.refs.len() < MAX_REFS, CellError::RefsOverflow);
        self.refs.push(cell);
        Ok(self)
    }

    /// Finishes building, returning the [`Cell`].
    pub fn build(&self) -> Cell {
        Cell {
            data: self.data.clone(),
            bits: self.bits,
            refs: self.refs.clone(),
        }
    }
}
