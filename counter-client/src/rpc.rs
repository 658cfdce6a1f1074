// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Read-only access to contract state through get-methods.

use std::collections::VecDeque;

use async_trait::async_trait;
use counter_base::Address;
use num_bigint::BigInt;
use num_traits::Num as _;
use thiserror::Error;

#[cfg(test)]
#[path = "unit_tests/rpc.rs"]
mod tests;

/// The get-method returning the counter value.
pub const COUNTER_GETTER: &str = "get_counter";

/// A value on the stack of the TON virtual machine, as exchanged with a node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StackEntry {
    /// An integer of up to 257 bits.
    Number(BigInt),
    /// A cell, as a base64 bag of cells.
    Cell(String),
    /// A slice of a cell, as a base64 bag of cells.
    Slice(String),
    /// An empty value.
    Null,
    /// An entry of a type this client doesn't interpret, kept in its JSON form.
    Other {
        /// The type tag reported by the node.
        kind: String,
        /// The value reported by the node.
        value: serde_json::Value,
    },
}

impl StackEntry {
    /// Returns the type tag of this entry, for error reporting.
    pub fn kind(&self) -> &str {
        match self {
            StackEntry::Number(_) => "num",
            StackEntry::Cell(_) => "cell",
            StackEntry::Slice(_) => "slice",
            StackEntry::Null => "null",
            StackEntry::Other { kind, .. } => kind,
        }
    }
}

/// The stack of values returned by a get-method, read from the top.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stack {
    entries: VecDeque<StackEntry>,
}

impl Stack {
    /// Returns the number of entries left to read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries left to read.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads the next entry.
    pub fn read(&mut self) -> Result<StackEntry, RpcError> {
        self.entries.pop_front().ok_or(RpcError::StackExhausted)
    }

    /// Reads the next entry as an arbitrary-precision integer.
    pub fn read_number(&mut self) -> Result<BigInt, RpcError> {
        match self.read()? {
            StackEntry::Number(number) => Ok(number),
            other => Err(RpcError::UnexpectedStackEntry {
                expected: "num",
                found: other.kind().to_owned(),
            }),
        }
    }
}

impl FromIterator<StackEntry> for Stack {
    fn from_iter<I: IntoIterator<Item = StackEntry>>(entries: I) -> Self {
        Stack {
            entries: entries.into_iter().collect(),
        }
    }
}

/// Errors when calling a get-method.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The request didn't reach the node or the response didn't come back.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with an error.
    #[error("node error: {message}")]
    Node {
        /// The error code reported by the node, if any.
        code: Option<i64>,
        /// The error message reported by the node.
        message: String,
    },

    /// The get-method ran but didn't finish successfully, for example because it doesn't
    /// exist.
    #[error("get-method `{method}` failed with exit code {exit_code}")]
    ExitCode {
        /// The get-method that was called.
        method: String,
        /// The exit code of the virtual machine.
        exit_code: i64,
    },

    /// The response could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A stack entry to send as an argument has no representation in requests.
    #[error("stack entries of type `{0}` can't be sent as arguments")]
    UnsupportedArgument(String),

    /// More entries were read than the get-method returned.
    #[error("the returned stack has no more entries")]
    StackExhausted,

    /// The stack entry has a different type than expected.
    #[error("expected a stack entry of type `{expected}`, found `{found}`")]
    UnexpectedStackEntry {
        /// The expected type.
        expected: &'static str,
        /// The type that was found.
        found: String,
    },
}

impl From<serde_json::Error> for RpcError {
    fn from(error: serde_json::Error) -> Self {
        RpcError::MalformedResponse(error.to_string())
    }
}

/// A client able to run read-only get-methods of contracts.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Runs the get-method `method` of the contract at `address` with the arguments in
    /// `stack`, returning the stack it leaves.
    async fn run_get_method(
        &self,
        address: &Address,
        method: &str,
        stack: &[StackEntry],
    ) -> Result<Stack, RpcError>;
}

/// Reads the counter value from the contract at `contract`.
pub async fn read_counter<Reader>(reader: &Reader, contract: &Address) -> Result<BigInt, RpcError>
where
    Reader: ChainReader + ?Sized,
{
    let mut stack = reader.run_get_method(contract, COUNTER_GETTER, &[]).await?;
    stack.read_number()
}

/// Parses an integer as rendered by nodes: hexadecimal with a `0x` prefix, optionally
/// negative, or plain decimal.
pub(crate) fn parse_number(string: &str) -> Result<BigInt, RpcError> {
    let malformed = || RpcError::MalformedResponse(format!("invalid number {string:?}"));
    let (negative, digits) = match string.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, string),
    };
    if digits.starts_with(['-', '+']) {
        return Err(malformed());
    }
    let magnitude = match digits.strip_prefix("0x") {
        Some(hex) => BigInt::from_str_radix(hex, 16),
        None => BigInt::from_str_radix(digits, 10),
    }
    .map_err(|_| malformed())?;
    Ok(if negative { -magnitude } else { magnitude })
}
