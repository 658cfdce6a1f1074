// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The state shown to the user, and its transitions.

use std::fmt;

use counter_base::Address;
use num_bigint::BigInt;

#[cfg(test)]
#[path = "unit_tests/state.rs"]
mod tests;

/// The text shown instead of the counter value when it could not be read.
pub const ERROR_MARKER: &str = "Error";
/// The text shown while the counter value has not been read yet.
pub const LOADING_MARKER: &str = "...";

/// What is known about the counter value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum CounterDisplay {
    /// No read has finished yet.
    #[default]
    Loading,
    /// The value returned by the last applied read.
    Value(BigInt),
    /// The last applied read failed.
    Error,
}

impl fmt::Display for CounterDisplay {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterDisplay::Loading => formatter.write_str(LOADING_MARKER),
            CounterDisplay::Value(value) => write!(formatter, "{value}"),
            CounterDisplay::Error => formatter.write_str(ERROR_MARKER),
        }
    }
}

/// The view state: the connected account, the counter and whether a transaction is being
/// processed.
///
/// Transitions consume the state and return the next one.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewState {
    /// The connected account, if any.
    pub address: Option<Address>,
    /// The counter value.
    pub counter: CounterDisplay,
    /// Whether a transaction is being processed.
    pub pending: bool,
}

impl ViewState {
    /// Returns `true` if an increment can be submitted.
    pub fn can_submit(&self) -> bool {
        self.address.is_some() && !self.pending
    }

    /// An account was connected.
    pub fn connected(self, address: Address) -> Self {
        ViewState {
            address: Some(address),
            ..self
        }
    }

    /// The account was disconnected, abandoning any transaction being processed.
    pub fn disconnected(self) -> Self {
        ViewState {
            address: None,
            pending: false,
            ..self
        }
    }

    /// A read returned the counter `value`.
    pub fn counter_loaded(self, value: BigInt) -> Self {
        ViewState {
            counter: CounterDisplay::Value(value),
            ..self
        }
    }

    /// A read failed.
    pub fn counter_failed(self) -> Self {
        ViewState {
            counter: CounterDisplay::Error,
            ..self
        }
    }

    /// A transaction is being submitted.
    pub fn submission_started(self) -> Self {
        ViewState {
            pending: true,
            ..self
        }
    }

    /// The transaction being processed failed or settled.
    pub fn submission_finished(self) -> Self {
        ViewState {
            pending: false,
            ..self
        }
    }
}
