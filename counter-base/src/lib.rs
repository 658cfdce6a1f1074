// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides the base types shared by the counter client: account addresses,
//! token amounts and the cells used as message payloads on the TON network.

#![deny(missing_docs)]

pub mod address;
pub mod amount;
pub mod cell;
mod crc;
#[cfg(with_metrics)]
pub mod prometheus_util;
pub mod sync;
pub mod tracing;

pub use crate::{
    address::{Address, AddressFlags},
    amount::Tokens,
    cell::{Cell, CellBuilder},
};

/// A macro for asserting that a condition is true, returning an error if it is not.
///
/// # Examples
///
/// ```
/// # use counter_base::ensure;
/// fn divide(x: i32, y: i32) -> Result<i32, String> {
///     ensure!(y != 0, "division by zero");
///     Ok(x / y)
/// }
///
/// assert_eq!(divide(10, 0), Err(String::from("division by zero")));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            return Err($e.into());
        }
    };
}
