// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! [`SensorInterface`] over an I2C bus, through any `i2cdev` device.
//!
//! The slave address is bound when the device is opened, so a write or a
//! read addresses the sensor directly. Register reads are a one byte write
//! of the register address followed by a read.

use super::SensorInterface;
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use log::trace;
use std::io::{self, ErrorKind};
use std::path::Path;

/// I2C device wrapped as a sensor transport
pub struct I2cInterface<D> {
    dev: D,
}

impl<D: I2CDevice> I2cInterface<D> {
    pub fn new(dev: D) -> Self {
        Self { dev }
    }

    /// Returns previously consumed I2C device.
    pub fn free(self) -> D {
        self.dev
    }
}

impl I2cInterface<LinuxI2CDevice> {
    /// Open `/dev/i2c-N` and bind it to the slave at `address`
    pub fn open<P: AsRef<Path>>(path: P, address: u16) -> io::Result<Self> {
        let dev = LinuxI2CDevice::new(path, address)
            .map_err(|e| io::Error::new(ErrorKind::Other, e))?;
        Ok(Self::new(dev))
    }
}

impl<D> SensorInterface for I2cInterface<D>
where
    D: I2CDevice,
    D::Error: core::fmt::Debug,
{
    type SensorError = D::Error;

    fn is_spi(&self) -> bool {
        false
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::SensorError> {
        trace!("i2c write {:02x?}", bytes);
        self.dev.write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::SensorError> {
        self.dev.read(buf)?;
        trace!("i2c read {:02x?}", buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2cdev::mock::MockI2CDevice;

    #[test]
    fn test_read_register_through_mock() {
        let mut dev = MockI2CDevice::new();
        dev.regmap.write_regs(0xF4, &[0x27, 0xA0]);
        let mut i2c = I2cInterface::new(dev);

        let mut buf = [0u8; 2];
        i2c.read_register(0xF4, &mut buf).unwrap();
        assert_eq!([0x27, 0xA0], buf);
        assert!(!i2c.is_spi());
    }

    #[test]
    fn test_register_write_pair() {
        let mut i2c = I2cInterface::new(MockI2CDevice::new());
        i2c.write(&[0xF4, 0x55]).unwrap();

        let mut buf = [0u8; 1];
        i2c.read_register(0xF4, &mut buf).unwrap();
        assert_eq!([0x55], buf);
    }
}
