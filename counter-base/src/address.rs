// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Account addresses of the TON network.
//!
//! An address is a workchain identifier and the 256-bit hash of the account's initial state.
//! It is usually exchanged in its *user-friendly* form: 36 bytes (a flags byte, the
//! workchain, the hash and a CRC-16 checksum) encoded as 48 base64 characters. The *raw*
//! form `<workchain>:<hex hash>` is also accepted when parsing.

use std::{fmt, str::FromStr};

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine as _,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{crc::crc16, ensure};

#[cfg(test)]
#[path = "unit_tests/address.rs"]
mod tests;

/// The flags byte tag of bounceable addresses.
const BOUNCEABLE_TAG: u8 = 0x11;
/// The flags byte tag of non-bounceable addresses.
const NON_BOUNCEABLE_TAG: u8 = 0x51;
/// The bit set in the flags byte of addresses only valid on the test network.
const TEST_ONLY_FLAG: u8 = 0x80;

/// The length of a decoded user-friendly address.
const FRIENDLY_LENGTH: usize = 36;
/// The length of a user-friendly address once encoded as base64.
const FRIENDLY_ENCODED_LENGTH: usize = 48;

/// The address of an account.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(with_testing, derive(test_strategy::Arbitrary))]
pub struct Address {
    /// The workchain the account lives on. The basechain is `0`, the masterchain `-1`.
    pub workchain: i8,
    /// The hash of the account's initial state.
    pub hash: [u8; 32],
}

/// The flags carried by the user-friendly form of an [`Address`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AddressFlags {
    /// Whether messages to this address should bounce back if the account doesn't exist.
    pub bounceable: bool,
    /// Whether this address should only be used on the test network.
    pub test_only: bool,
}

impl Default for AddressFlags {
    fn default() -> Self {
        AddressFlags {
            bounceable: true,
            test_only: false,
        }
    }
}

/// Errors when parsing an [`Address`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum AddressError {
    /// The string is neither a raw nor a user-friendly address.
    #[error("invalid address length: {0}")]
    InvalidLength(usize),

    /// The base64 encoding is broken.
    #[error("invalid base64 in address")]
    InvalidBase64,

    /// The flags byte is not a known tag.
    #[error("unknown address tag: {0:#04x}")]
    UnknownTag(u8),

    /// The checksum does not match the address contents.
    #[error("address checksum mismatch")]
    ChecksumMismatch,

    /// The workchain part of a raw address is not a number in range.
    #[error("invalid workchain in raw address: {0}")]
    InvalidWorkchain(String),

    /// The hash part of a raw address is not 64 hexadecimal digits.
    #[error("invalid hash in raw address")]
    InvalidHash,
}

impl Address {
    /// Creates an [`Address`] on the given `workchain`.
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Address { workchain, hash }
    }

    /// Parses the user-friendly form of an address, returning it together with its flags.
    ///
    /// Both the standard and the URL-safe base64 alphabets are accepted.
    pub fn parse_friendly(friendly: &str) -> Result<(Self, AddressFlags), AddressError> {
        ensure!(
            friendly.len() == FRIENDLY_ENCODED_LENGTH,
            AddressError::InvalidLength(friendly.len())
        );
        let bytes = if friendly.contains(['-', '_']) {
            URL_SAFE.decode(friendly)
        } else {
            STANDARD.decode(friendly)
        }
        .map_err(|_| AddressError::InvalidBase64)?;
        ensure!(
            bytes.len() == FRIENDLY_LENGTH,
            AddressError::InvalidLength(bytes.len())
        );

        let (contents, checksum) = bytes.split_at(34);
        ensure!(
            crc16(contents).to_be_bytes() == checksum,
            AddressError::ChecksumMismatch
        );

        let tag = contents[0];
        let test_only = tag & TEST_ONLY_FLAG != 0;
        let bounceable = match tag & !TEST_ONLY_FLAG {
            BOUNCEABLE_TAG => true,
            NON_BOUNCEABLE_TAG => false,
            _ => return Err(AddressError::UnknownTag(tag)),
        };

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&contents[2..34]);
        let address = Address {
            workchain: contents[1] as i8,
            hash,
        };

        Ok((
            address,
            AddressFlags {
                bounceable,
                test_only,
            },
        ))
    }

    /// Parses the raw `<workchain>:<hex hash>` form of an address.
    pub fn parse_raw(raw: &str) -> Result<Self, AddressError> {
        let (workchain, hash) = raw
            .split_once(':')
            .ok_or(AddressError::InvalidLength(raw.len()))?;
        let workchain = workchain
            .parse::<i8>()
            .map_err(|_| AddressError::InvalidWorkchain(workchain.to_owned()))?;
        let hash = hex::decode(hash)
            .ok()
            .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
            .ok_or(AddressError::InvalidHash)?;
        Ok(Address { workchain, hash })
    }

    /// Encodes the address in its user-friendly form using the URL-safe base64 alphabet.
    pub fn to_friendly(&self, flags: AddressFlags) -> String {
        URL_SAFE.encode(self.friendly_bytes(flags))
    }

    /// Encodes the address in its user-friendly form using the standard base64 alphabet.
    pub fn to_friendly_standard(&self, flags: AddressFlags) -> String {
        STANDARD.encode(self.friendly_bytes(flags))
    }

    /// Returns the raw `<workchain>:<hex hash>` form of the address.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    fn friendly_bytes(&self, flags: AddressFlags) -> [u8; FRIENDLY_LENGTH] {
        let mut tag = if flags.bounceable {
            BOUNCEABLE_TAG
        } else {
            NON_BOUNCEABLE_TAG
        };
        if flags.test_only {
            tag |= TEST_ONLY_FLAG;
        }

        let mut bytes = [0u8; FRIENDLY_LENGTH];
        bytes[0] = tag;
        bytes[1] = self.workchain as u8;
        bytes[2..34].copy_from_slice(&self.hash);
        let checksum = crc16(&bytes[..34]);
        bytes[34..].copy_from_slice(&checksum.to_be_bytes());
        bytes
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        if string.contains(':') {
            Address::parse_raw(string)
        } else {
            Address::parse_friendly(string).map(|(address, _)| address)
        }
    }
}

/// Displays the bounceable user-friendly form.
impl fmt::Display for Address {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.to_friendly(AddressFlags::default()))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        string.parse().map_err(de::Error::custom)
    }
}
