// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Encoding of the message body that asks the counter contract to add to its value.

use counter_base::{cell::CellError, Cell, CellBuilder, Tokens};
use thiserror::Error;

#[cfg(test)]
#[path = "unit_tests/message.rs"]
mod tests;

/// The operation code of the contract's `Add` message.
///
/// This is the code derived for an `Add { queryId: u64, amount: u32 }` message and has not
/// been confirmed against the deployed contract's interface. It can be overridden through
/// the client configuration.
pub const ADD_OPCODE: u32 = 0x7e87_64ef;

/// Errors when encoding an [`IncrementMessage`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum MessageError {
    /// The whole part of the amount does not fit in the 32-bit amount field.
    #[error("amount {0} does not fit in the 32-bit amount field")]
    AmountOutOfRange(Tokens),

    /// The fields could not be stored in a cell.
    #[error(transparent)]
    Cell(#[from] CellError),
}

/// The body of an `Add` message: an operation code, a query identifier and the amount to
/// add.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IncrementMessage {
    /// The operation code selecting the contract action.
    pub opcode: u32,
    /// The query identifier, unused by the contract and always zero.
    pub query_id: u64,
    /// The amount to add to the counter.
    pub amount: u32,
}

impl IncrementMessage {
    /// Creates the message adding `amount` to the counter.
    ///
    /// Only the whole part of `amount` is encoded: fractions are truncated, so an amount of
    /// `0.01` adds zero.
    pub fn new(amount: Tokens) -> Result<Self, MessageError> {
        let amount = u32::try_from(amount.whole_tokens())
            .map_err(|_| MessageError::AmountOutOfRange(amount))?;

        Ok(IncrementMessage {
            opcode: ADD_OPCODE,
            query_id: 0,
            amount,
        })
    }

    /// Replaces the operation code.
    pub fn with_opcode(mut self, opcode: u32) -> Self {
        self.opcode = opcode;
        self
    }

    /// Builds the cell holding the message body.
    pub fn to_cell(&self) -> Result<Cell, MessageError> {
        let mut builder = CellBuilder::new();
        builder
            .store_uint(self.opcode.into(), 32)?
            .store_uint(self.query_id, 64)?
            .store_uint(self.amount.into(), 32)?;
        Ok(builder.build())
    }

    /// Encodes the message body as a base64 bag of cells, ready to be attached to a
    /// transaction.
    pub fn to_payload(&self) -> Result<String, MessageError> {
        Ok(self.to_cell()?.to_boc_base64())
    }
}
