// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bosch BMP280 barometric pressure and temperature driver.
//!
//! Construction probes the chip, resets it, loads the factory calibration and
//! seeds the options from the live registers. Option changes are lazy: the
//! setters only record the new value and the next measurement (or
//! [`Bmp280::output_data_period`]) commits them with a soft reset followed by
//! an ordered register write.

pub mod calibration;
pub mod options;

use crate::{
    constants::{
        BITS_STATUS_IM_UPDATE, BITS_STATUS_MEASURING, CALIB_LEN, CHIP_ID_PROBE_DELAY_MS,
        CHIP_ID_PROBE_TRIES, KNOWN_CHIP_IDS, REG_CALIB, REG_CHIP_ID, REG_CONFIG, REG_CTRL_MEAS,
        REG_SOFT_RESET, REG_STATUS, REG_VALUES, SOFT_RESET_DELAY_MS, SOFT_RESET_VALUE,
        SPI_READ_FLAG, SPI_WRITE_MASK, VALUES_LEN,
    },
    interface::SensorInterface,
    DriverError,
};
use calibration::Calibration;
use log::{debug, trace, warn};
use options::{Filter, Mode, Options, Oversampling, SpiWiring, Standby};

/// One compensated sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Pressure in pascal
    pub pressure: f64,
    /// Temperature in degrees Celsius
    pub temperature: f64,
}

/// Content of the status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// A conversion is running
    pub measuring: bool,
    /// NVM data is being copied to the image registers
    pub im_update: bool,
}

/// Decode the 20-bit pressure and temperature codes of the output burst
fn decode_raw(buf: &[u8; VALUES_LEN]) -> (f64, f64) {
    let code = |b: &[u8]| (u32::from(b[0]) << 12) | (u32::from(b[1]) << 4) | (u32::from(b[2]) >> 4);
    (f64::from(code(&buf[0..3])), f64::from(code(&buf[3..6])))
}

/// BMP280 driver
pub struct Bmp280<SI> {
    sensor_interface: SI,
    calibration: Calibration,
    options: Options,
    /// Options on the chip match `options`
    committed: bool,
    /// Discovery and initialization succeeded
    operational: bool,
    chip_id: u8,
    /// Output data period computed by the last commit, in ms
    output_data_period: u32,
    /// OR-ed into register addresses on reads
    read_flag: u8,
    /// AND-ed into register addresses on writes
    write_mask: u8,
}

impl<SI> Bmp280<SI> {
    /// Discovery and initialization outcome
    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Identity byte read during discovery, 0 if none was accepted
    pub fn chip_id(&self) -> u8 {
        self.chip_id
    }

    /// Options the driver holds, committed or not
    pub fn options(&self) -> Options {
        self.options
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.committed = false;
        self.options.mode = mode;
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.committed = false;
        self.options.filter = filter;
    }

    pub fn set_oversampling_pressure(&mut self, oversampling: Oversampling) {
        self.committed = false;
        self.options.oversampling_pressure = oversampling;
    }

    pub fn set_oversampling_temperature(&mut self, oversampling: Oversampling) {
        self.committed = false;
        self.options.oversampling_temperature = oversampling;
    }

    pub fn set_standby(&mut self, standby: Standby) {
        self.committed = false;
        self.options.standby = standby;
    }

    pub fn set_spi_wiring(&mut self, wiring: SpiWiring) {
        self.committed = false;
        self.options.spi_wiring = wiring;
    }

    /// Replace every option at once
    pub fn set_options(&mut self, options: Options) {
        self.committed = false;
        self.options = options;
    }

    /// Returns previously consumed sensor interface instance.
    pub fn free(self) -> SI {
        self.sensor_interface
    }
}

impl<SI, SE> Bmp280<SI>
where
    SI: SensorInterface<SensorError = SE>,
    SE: core::fmt::Debug,
{
    /// Probe the chip, reset it, load its calibration and seed the options
    /// from its registers.
    ///
    /// Never fails: check [`Bmp280::is_operational`] afterwards.
    pub fn new_with_interface(sensor_interface: SI) -> Self {
        let spi = sensor_interface.is_spi();
        let mut driver = Self {
            sensor_interface,
            calibration: Calibration::default(),
            options: Options::default(),
            committed: false,
            operational: false,
            chip_id: 0,
            output_data_period: 0,
            read_flag: if spi { SPI_READ_FLAG } else { 0x00 },
            write_mask: if spi { SPI_WRITE_MASK } else { 0xFF },
        };
        match driver.discover() {
            Ok(()) => driver.operational = true,
            Err(e) => warn!("BMP280 initialization failed: {:?}", e),
        }
        driver
    }

    fn discover(&mut self) -> Result<(), DriverError<SE>> {
        self.probe_chip_id()?;
        self.soft_reset()?;

        let mut calib = [0u8; CALIB_LEN];
        self.read_register(REG_CALIB, &mut calib)?;
        self.calibration = Calibration::from_bytes(&calib);

        let mut regs = [0u8; 2];
        self.read_register(REG_CTRL_MEAS, &mut regs)?;
        self.options = Options::from_registers(regs[0], regs[1]);
        debug!("BMP280 options seeded from chip: {:?}", self.options);
        Ok(())
    }

    fn probe_chip_id(&mut self) -> Result<(), DriverError<SE>> {
        let mut last = 0u8;
        for attempt in 1..=CHIP_ID_PROBE_TRIES {
            let mut id = [0u8; 1];
            match self.read_register(REG_CHIP_ID, &mut id) {
                Ok(()) if KNOWN_CHIP_IDS.contains(&id[0]) => {
                    debug!("BMP280 id 0x{:02X} found after {} try(ies)", id[0], attempt);
                    self.chip_id = id[0];
                    return Ok(());
                }
                Ok(()) => {
                    trace!("unknown chip id 0x{:02X}", id[0]);
                    last = id[0];
                }
                Err(e) => trace!("chip id read failed: {:?}", e),
            }
            self.sensor_interface.delay_ms(CHIP_ID_PROBE_DELAY_MS);
        }
        warn!("no BMP280 device found");
        Err(DriverError::InvalidChipId(last))
    }

    /// Reset the chip. Power mode falls back to sleep and the config
    /// registers to their defaults.
    fn soft_reset(&mut self) -> Result<(), DriverError<SE>> {
        trace!("soft_reset");
        self.write(&[REG_SOFT_RESET & self.write_mask, SOFT_RESET_VALUE])
            .map_err(|e| {
                warn!("soft reset failure");
                e
            })?;
        self.sensor_interface.delay_ms(SOFT_RESET_DELAY_MS);
        Ok(())
    }

    /// Write the held options to the chip.
    ///
    /// Both control registers go out in one write, the power mode in a
    /// second write of `ctrl_meas` when it is not sleep.
    fn commit_options(&mut self) -> Result<(), DriverError<SE>> {
        self.committed = false;
        let res = self.write_options();
        if res.is_err() {
            warn!("can't set options");
        }
        res
    }

    fn write_options(&mut self) -> Result<(), DriverError<SE>> {
        self.soft_reset()?;

        let mut regs = [0u8; 2];
        self.read_register(REG_CTRL_MEAS, &mut regs)?;
        let ctrl_meas = self.options.encode_ctrl_meas(regs[0]);
        let config = self.options.encode_config(regs[1]);
        self.write(&[
            REG_CTRL_MEAS & self.write_mask,
            ctrl_meas,
            REG_CONFIG & self.write_mask,
            config,
        ])?;
        self.output_data_period = self.options.output_data_period_ms();

        if self.options.mode != Mode::Sleep {
            let ctrl_meas = self.options.encode_mode(ctrl_meas);
            self.write(&[REG_CTRL_MEAS & self.write_mask, ctrl_meas])?;
        }
        self.committed = true;
        debug!(
            "BMP280 options committed, output data period {} ms",
            self.output_data_period
        );
        Ok(())
    }

    /// Minimum delay between two measurements, in milliseconds.
    ///
    /// Commits pending options first.
    pub fn output_data_period(&mut self) -> Result<u32, DriverError<SE>> {
        if !self.operational {
            return Err(DriverError::NotOperational);
        }
        if !self.committed {
            self.commit_options()?;
        }
        Ok(self.output_data_period)
    }

    /// Take one compensated sample.
    ///
    /// Sleep mode is promoted to forced mode. Options are committed first
    /// when they are pending or when the chip is not measuring
    /// periodically, which also starts a forced conversion.
    pub fn read_values(&mut self) -> Result<Measurement, DriverError<SE>> {
        if self.options.mode == Mode::Sleep {
            self.options.mode = Mode::Forced;
        }
        if !self.operational {
            return Err(DriverError::NotOperational);
        }
        if !self.committed || self.options.mode != Mode::Normal {
            self.commit_options()?;
        }

        let mut buf = [0u8; VALUES_LEN];
        self.read_register(REG_VALUES, &mut buf)?;
        let (raw_pressure, raw_temperature) = decode_raw(&buf);
        trace!("raw pressure {} temperature {}", raw_pressure, raw_temperature);

        let (pressure, temperature) = self.calibration.compensate(raw_pressure, raw_temperature);
        Ok(Measurement {
            pressure,
            temperature,
        })
    }

    /// Read the status register
    pub fn status(&mut self) -> Result<Status, DriverError<SE>> {
        if !self.operational {
            return Err(DriverError::NotOperational);
        }
        let mut reg = [0u8; 1];
        self.read_register(REG_STATUS, &mut reg)?;
        Ok(Status {
            measuring: BITS_STATUS_MEASURING.get(reg[0]) != 0,
            im_update: BITS_STATUS_IM_UPDATE.get(reg[0]) != 0,
        })
    }

    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), DriverError<SE>> {
        trace!("read 0x{:02X} len {}", reg, buf.len());
        self.sensor_interface
            .read_register(reg | self.read_flag, buf)
            .map_err(DriverError::CommError)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DriverError<SE>> {
        trace!("write {:02X?}", bytes);
        self.sensor_interface
            .write(bytes)
            .map_err(DriverError::CommError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_raw() {
        let buf = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00];
        let (p, t) = decode_raw(&buf);
        assert_eq!(415148.0, p);
        assert_eq!(519888.0, t);
    }

    #[test]
    fn test_decode_raw_drops_low_nibble() {
        let (p, t) = decode_raw(&[0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x0F]);
        assert_eq!(f64::from(0xF_FFFFu32), p);
        assert_eq!(0.0, t);
    }
}
