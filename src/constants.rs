// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Constants for the BMP280 and SGP30 drivers.
//!
//! This module contains the register map, chip identities, bit-field layouts
//! and protocol constants used to talk to both sensors.

// =============================================================================
// Bus Addresses
// =============================================================================

/// BMP280 I2C address with SDO tied to GND
pub const BMP280_I2C_ADDR_PRIMARY: u16 = 0x76;
/// BMP280 I2C address with SDO tied to VDDIO
pub const BMP280_I2C_ADDR_SECONDARY: u16 = 0x77;
/// SGP30 fixed I2C address
pub const SGP30_I2C_ADDR: u16 = 0x58;

// =============================================================================
// BMP280 Register Map
// =============================================================================

/// Calibration block, 24 bytes read in one burst
pub const REG_CALIB: u8 = 0x88;
/// Chip identity
pub const REG_CHIP_ID: u8 = 0xD0;
/// Soft reset, write [`SOFT_RESET_VALUE`]
pub const REG_SOFT_RESET: u8 = 0xE0;
/// Device status
pub const REG_STATUS: u8 = 0xF3;
/// Measurement control: oversampling and power mode
pub const REG_CTRL_MEAS: u8 = 0xF4;
/// Configuration: standby, filter, SPI 3-wire
pub const REG_CONFIG: u8 = 0xF5;
/// Start of the 6-byte pressure/temperature output burst
pub const REG_VALUES: u8 = 0xF7;

/// Length of the calibration block
pub const CALIB_LEN: usize = 24;
/// Length of the pressure/temperature output burst
pub const VALUES_LEN: usize = 6;

/// Value written to [`REG_SOFT_RESET`] to reset the chip
pub const SOFT_RESET_VALUE: u8 = 0xB6;
/// Time the chip needs after a soft reset
pub const SOFT_RESET_DELAY_MS: u32 = 2;

/// Identity of the early engineering samples
pub const CHIP_ID_SAMPLE_1: u8 = 0x56;
/// Identity of the late engineering samples
pub const CHIP_ID_SAMPLE_2: u8 = 0x57;
/// Identity of mass production parts
pub const CHIP_ID_PRODUCTION: u8 = 0x58;
/// All identities the driver accepts
pub const KNOWN_CHIP_IDS: [u8; 3] = [CHIP_ID_SAMPLE_1, CHIP_ID_SAMPLE_2, CHIP_ID_PRODUCTION];

/// Number of identity reads before giving up
pub const CHIP_ID_PROBE_TRIES: usize = 5;
/// Pause between identity reads
pub const CHIP_ID_PROBE_DELAY_MS: u32 = 10;

/// SPI: register address flag for reads
pub const SPI_READ_FLAG: u8 = 0x80;
/// SPI: register address mask for writes
pub const SPI_WRITE_MASK: u8 = 0x7F;

// =============================================================================
// BMP280 Bit Fields
// =============================================================================

/// Position and mask of a field inside a register byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub pos: u8,
    pub mask: u8,
}

impl BitField {
    pub const fn new(pos: u8, mask: u8) -> Self {
        Self { pos, mask }
    }

    /// Extract the field value from `reg`
    #[inline]
    pub fn get(self, reg: u8) -> u8 {
        (reg & self.mask) >> self.pos
    }

    /// Return `reg` with the field replaced by `value`, other bits untouched
    #[inline]
    pub fn set(self, reg: u8, value: u8) -> u8 {
        (reg & !self.mask) | ((value << self.pos) & self.mask)
    }
}

/// ctrl_meas[7:5]
pub const BITS_OVERSAMP_TMPRT: BitField = BitField::new(5, 0xE0);
/// ctrl_meas[4:2]
pub const BITS_OVERSAMP_PRESS: BitField = BitField::new(2, 0x1C);
/// ctrl_meas[1:0]
pub const BITS_MODE: BitField = BitField::new(0, 0x03);
/// config[7:5]
pub const BITS_STANDBY_TIME: BitField = BitField::new(5, 0xE0);
/// config[4:2]
pub const BITS_FILTER: BitField = BitField::new(2, 0x1C);
/// config[0]
pub const BITS_SPI_WIRING: BitField = BitField::new(0, 0x01);
/// status[3], set while a conversion is running
pub const BITS_STATUS_MEASURING: BitField = BitField::new(3, 0x08);
/// status[0], set while NVM data is copied to image registers
pub const BITS_STATUS_IM_UPDATE: BitField = BitField::new(0, 0x01);

// =============================================================================
// BMP280 Output Data Period (microseconds)
// =============================================================================

/// Fixed cost to start a measurement
pub const ODR_START_US: u32 = 1000;
/// Added so the final division by 1000 rounds up
pub const ODR_ROUNDING_US: u32 = 500;
/// Duration of one 1x oversampling conversion
pub const ODR_CONVERSION_US: u32 = 2000;
/// Added when pressure is measured at all
pub const ODR_PRESSURE_SETUP_US: u32 = 500;
/// Standby time for standby code 0
pub const ODR_STANDBY_MIN_US: u32 = 500;
/// Standby time for standby code 1, doubled for each following code
pub const ODR_STANDBY_BASE_US: u32 = 62_500;

// =============================================================================
// SGP30 Protocol
// =============================================================================

/// CRC-8 polynomial x^8 + x^5 + x^4 + 1 (0x131, leading bit implicit)
pub const CRC8_POLYNOMIAL: u8 = 0x31;
/// CRC-8 seed
pub const CRC8_INIT: u8 = 0xFF;

/// Bytes per wire word: 2 data bytes and 1 CRC byte
pub const WORD_FRAME_LEN: usize = 3;
/// Largest number of values any command replies with
pub const MAX_REPLY_VALUES: usize = 3;
/// Largest number of arguments any command takes
pub const MAX_COMMAND_ARGS: usize = 2;
/// Transmit buffer: opcode plus framed arguments
pub const TX_BUF_LEN: usize = 2 + MAX_COMMAND_ARGS * WORD_FRAME_LEN;
/// Receive buffer: framed reply values
pub const RX_BUF_LEN: usize = MAX_REPLY_VALUES * WORD_FRAME_LEN;

/// Margin added to the documented duration of a command before polling
pub const COMMAND_DELAY_MARGIN_US: u32 = 5;

/// Reply of `measure_test` on a healthy chip
pub const SELF_TEST_PASS: u16 = 0xD400;

/// Absolute humidity must stay below this value (mg/m^3)
pub const HUMIDITY_LIMIT_MG_M3: u32 = 256_000;

/// A stored baseline is only worth restoring for one week
pub const BASELINE_VALIDITY_SECS: u64 = 7 * 24 * 60 * 60;

// Feature set version word layout
/// Product type, bits 15:12
pub const VERSION_PRODUCT_TYPE_MASK: u16 = 0xF000;
/// Reserved, must be clear for a feature set to match
pub const VERSION_RESERVED_MASK: u16 = 0x0100;
/// Major field, must match exactly
pub const VERSION_MAJOR_MASK: u16 = 0x00E0;
/// Minor field, device value must be at least the feature set value
pub const VERSION_MINOR_MASK: u16 = 0x001F;
/// Product version, bits 7:0
pub const VERSION_PRODUCT_VERSION_MASK: u16 = 0x00FF;
