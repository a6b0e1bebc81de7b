// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Register-level drivers for two environmental sensors.
//!
//! - [`Bmp280`]: Bosch BMP280 barometric pressure and temperature sensor,
//!   over I2C or SPI.
//! - [`Sgp30`]: Sensirion SGP30 multi-pixel gas sensor, over I2C.
//!
//! Both drivers talk to the chip through a [`SensorInterface`] supplied by
//! the application. Linux backends for `/dev/i2c-N` and `/dev/spidevX.Y` are
//! provided in [`interface`].

pub mod bmp280;
pub mod constants;
pub mod interface;
pub mod sgp30;

pub use bmp280::{Bmp280, Measurement, Status};
pub use bmp280::options::{Filter, Mode, Options, Oversampling, SpiWiring, Standby};
pub use constants::{BMP280_I2C_ADDR_PRIMARY, BMP280_I2C_ADDR_SECONDARY, SGP30_I2C_ADDR};
pub use interface::{I2cInterface, SensorInterface, SpiInterface};
pub use sgp30::features::{CommandId, FeatureSet};
pub use sgp30::{AirQuality, Baseline, RawSignals, Sgp30};

/// Errors in this crate
#[derive(Debug)]
pub enum DriverError<E> {
    /// Communications error
    CommError(E),
    /// No known chip identity was read; carries the last byte seen
    InvalidChipId(u8),
    /// Device discovery or initialization failed, the driver refuses to run
    NotOperational,
    /// A reply triplet failed its CRC-8 check
    ChecksumMismatch { expected: u8, received: u8 },
    /// Reply requested for a command that is not the one awaiting a reply
    CommandMismatch { requested: CommandId, running: Option<CommandId> },
    /// Command not available in the feature set of this chip
    UnsupportedCommand(CommandId),
    /// Absolute humidity outside 0..256000 mg/m^3
    HumidityOutOfRange(f64),
    /// More argument words than any command takes
    TooManyArguments(usize),
}
