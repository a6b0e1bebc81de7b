// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bus access for the sensor drivers.
//!
//! The drivers only see a [`SensorInterface`]: register reads, raw writes,
//! raw reads and a blocking delay. The application owns the bus and picks a
//! backend: [`I2cInterface`] over `i2cdev`, [`SpiInterface`] over `spidev`,
//! or its own implementation.

pub mod delay;
pub mod i2c;
pub mod spi;
pub mod spidev;

pub use i2c::I2cInterface;
pub use spi::SpiInterface;

use core::fmt::Debug;

/// The transport capability each driver depends on.
pub trait SensorInterface {
    /// Error reported by the underlying bus
    type SensorError: Debug;

    /// True when register addresses need the SPI read/write flag bits
    fn is_spi(&self) -> bool;

    /// Block for at least `micros` microseconds
    fn delay_us(&mut self, micros: u32) {
        delay::delay_us(micros);
    }

    /// Block for at least `millis` milliseconds
    fn delay_ms(&mut self, millis: u32) {
        self.delay_us(millis.saturating_mul(1000));
    }

    /// Send `bytes` to the device. A short write is an error.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::SensorError>;

    /// Fill `buf` from the device. A short read is an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::SensorError>;

    /// Read `buf.len()` bytes starting at register `reg`.
    ///
    /// `reg` already carries any addressing flag the driver applied.
    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::SensorError> {
        self.write(&[reg])?;
        self.read(buf)
    }
}

/// Lend a bus to a driver without giving up ownership
impl<T: SensorInterface + ?Sized> SensorInterface for &mut T {
    type SensorError = T::SensorError;

    fn is_spi(&self) -> bool {
        (**self).is_spi()
    }

    fn delay_us(&mut self, micros: u32) {
        (**self).delay_us(micros)
    }

    fn delay_ms(&mut self, millis: u32) {
        (**self).delay_ms(millis)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::SensorError> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::SensorError> {
        (**self).read(buf)
    }

    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::SensorError> {
        (**self).read_register(reg, buf)
    }
}
