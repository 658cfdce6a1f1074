// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Amounts of the native token, counted in nanotons.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::ensure;

#[cfg(test)]
#[path = "unit_tests/amount.rs"]
mod tests;

/// The number of decimal places of one token.
pub const DECIMALS: usize = 9;
/// The number of nanotons in one token.
pub const NANOTONS_PER_TOKEN: u128 = 1_000_000_000;

/// An amount of the native token.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(with_testing, derive(test_strategy::Arbitrary))]
pub struct Tokens(u128);

/// Errors when parsing an amount of [`Tokens`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum AmountError {
    /// The amount is empty or has characters that are not digits.
    #[error("invalid amount: {0:?}")]
    Invalid(String),

    /// The amount has more decimal places than a nanoton can represent.
    #[error("amount {0:?} has more than {DECIMALS} decimal places")]
    TooPrecise(String),

    /// The amount doesn't fit in 128 bits of nanotons.
    #[error("amount {0:?} is too large")]
    Overflow(String),
}

impl Tokens {
    /// The zero amount.
    pub const ZERO: Tokens = Tokens(0);

    /// Creates an amount from a number of nanotons.
    pub const fn from_nanotons(nanotons: u128) -> Self {
        Tokens(nanotons)
    }

    /// Creates an amount from a number of whole tokens.
    pub const fn from_tokens(tokens: u64) -> Self {
        Tokens(tokens as u128 * NANOTONS_PER_TOKEN)
    }

    /// Returns the amount in nanotons.
    pub const fn nanotons(&self) -> u128 {
        self.0
    }

    /// Returns the number of whole tokens, discarding the fractional part.
    pub const fn whole_tokens(&self) -> u128 {
        self.0 / NANOTONS_PER_TOKEN
    }

    /// Returns `true` if the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Tokens {
    type Err = AmountError;

    /// Parses a decimal amount of tokens, such as `5` or `0.01`.
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let invalid = || AmountError::Invalid(string.to_owned());
        let (whole, fraction) = string.trim().split_once('.').unwrap_or((string.trim(), ""));

        ensure!(!whole.is_empty() || !fraction.is_empty(), invalid());
        ensure!(
            whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()),
            invalid()
        );
        ensure!(
            fraction.len() <= DECIMALS,
            AmountError::TooPrecise(string.to_owned())
        );

        let overflow = || AmountError::Overflow(string.to_owned());
        let whole = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| overflow())?
        };
        let fraction = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<DECIMALS$}")
                .parse::<u128>()
                .map_err(|_| invalid())?
        };

        whole
            .checked_mul(NANOTONS_PER_TOKEN)
            .and_then(|nanotons| nanotons.checked_add(fraction))
            .map(Tokens)
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / NANOTONS_PER_TOKEN;
        let fraction = self.0 % NANOTONS_PER_TOKEN;
        if fraction == 0 {
            write!(formatter, "{whole}")
        } else {
            let fraction = format!("{fraction:0>DECIMALS$}");
            write!(formatter, "{whole}.{}", fraction.trim_end_matches('0'))
        }
    }
}

impl Serialize for Tokens {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Tokens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        string.parse().map_err(de::Error::custom)
    }
}
