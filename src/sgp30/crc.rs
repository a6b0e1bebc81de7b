// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! CRC-8 protecting every 16-bit word on the SGP30 wire.

use crate::constants::{CRC8_INIT, CRC8_POLYNOMIAL};
use crc_any::CRCu8;

/// CRC-8, polynomial 0x31, seed 0xFF, MSB first, no final XOR
pub fn checksum(bytes: &[u8]) -> u8 {
    let mut crc = CRCu8::create_crc(CRC8_POLYNOMIAL, 8, CRC8_INIT, 0x00, false);
    crc.digest(bytes);
    crc.get_crc()
}
