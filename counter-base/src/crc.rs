// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Checksums used by user-friendly addresses and bags of cells.

/// CRC-16/XMODEM, the checksum appended to user-friendly addresses.
pub(crate) fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for byte in data {
        crc ^= u16::from(*byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// CRC-32C (Castagnoli), the optional checksum at the end of a bag of cells.
pub(crate) fn crc32c(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for byte in data {
        crc ^= u32::from(*byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0x82F6_3B78
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::{crc16, crc32c};

    #[test]
    fn check_values() {
        assert_eq!(crc16(b"123456789"), 0x31C3);
        assert_eq!(crc32c(b"123456789"), 0xE306_9283);
    }
}
