// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Measurement options of the BMP280 and their register encoding.
//!
//! The options live in two registers: `ctrl_meas` (oversampling and power
//! mode) and `config` (standby time, IIR filter, SPI 3-wire). Encoding only
//! touches the fields the driver manages and keeps every other bit of the
//! byte it is given.

use crate::constants::{
    BITS_FILTER, BITS_MODE, BITS_OVERSAMP_PRESS, BITS_OVERSAMP_TMPRT, BITS_SPI_WIRING,
    BITS_STANDBY_TIME, ODR_CONVERSION_US, ODR_PRESSURE_SETUP_US, ODR_ROUNDING_US,
    ODR_STANDBY_BASE_US, ODR_STANDBY_MIN_US, ODR_START_US,
};

/// Oversampling of a pressure or temperature conversion.
///
/// Higher oversampling reduces noise at the cost of conversion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Oversampling {
    /// Conversion skipped, output stays at 0x80000
    #[default]
    None = 0,
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

impl Oversampling {
    /// Decode a 3-bit register field. Codes above 5 also mean x16.
    pub fn from_bits(value: u8) -> Self {
        match value {
            0 => Oversampling::None,
            1 => Oversampling::X1,
            2 => Oversampling::X2,
            3 => Oversampling::X4,
            4 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }

    /// Number of 1x conversions this setting runs: `(1 << code) >> 1`
    pub fn multiplier(self) -> u32 {
        (1u32 << self as u32) >> 1
    }
}

/// Power mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Mode {
    /// No measurement. Reading values promotes sleep to forced.
    #[default]
    Sleep = 0x00,
    /// One measurement on demand, then back to sleep
    Forced = 0x01,
    /// Periodic measurements separated by the standby time
    Normal = 0x03,
}

impl Mode {
    /// Decode the 2-bit register field. 0b10 is a second forced encoding.
    pub fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0x00 => Mode::Sleep,
            0x03 => Mode::Normal,
            _ => Mode::Forced,
        }
    }
}

/// IIR filter coefficient, smooths short disturbances such as a slammed door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Filter {
    #[default]
    Off = 0x00,
    Coeff2 = 0x01,
    Coeff4 = 0x02,
    Coeff8 = 0x03,
    Coeff16 = 0x04,
}

impl Filter {
    /// Decode a 3-bit register field. Codes above 4 also mean 16.
    pub fn from_bits(value: u8) -> Self {
        match value {
            0 => Filter::Off,
            1 => Filter::Coeff2,
            2 => Filter::Coeff4,
            3 => Filter::Coeff8,
            _ => Filter::Coeff16,
        }
    }
}

/// Inactive time between two measurements in normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Standby {
    #[default]
    Ms0_5 = 0x00,
    Ms62_5 = 0x01,
    Ms125 = 0x02,
    Ms250 = 0x03,
    Ms500 = 0x04,
    Ms1000 = 0x05,
    Ms2000 = 0x06,
    Ms4000 = 0x07,
}

impl Standby {
    /// Decode a 3-bit register field
    pub fn from_bits(value: u8) -> Self {
        match value & 0x07 {
            0 => Standby::Ms0_5,
            1 => Standby::Ms62_5,
            2 => Standby::Ms125,
            3 => Standby::Ms250,
            4 => Standby::Ms500,
            5 => Standby::Ms1000,
            6 => Standby::Ms2000,
            _ => Standby::Ms4000,
        }
    }

    /// Contribution to the output data period, in microseconds
    pub fn period_us(self) -> u32 {
        match self as u32 {
            0 => ODR_STANDBY_MIN_US,
            code => ODR_STANDBY_BASE_US << (code - 1),
        }
    }
}

/// SPI interface wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SpiWiring {
    #[default]
    FourWire = 0,
    ThreeWire = 1,
}

impl SpiWiring {
    pub fn from_bits(value: u8) -> Self {
        if value & 0x01 == 0 {
            SpiWiring::FourWire
        } else {
            SpiWiring::ThreeWire
        }
    }
}

/// Everything the driver writes to `ctrl_meas` and `config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub oversampling_temperature: Oversampling,
    pub oversampling_pressure: Oversampling,
    pub mode: Mode,
    pub standby: Standby,
    pub filter: Filter,
    pub spi_wiring: SpiWiring,
}

impl Options {
    /// Decode the live `ctrl_meas` and `config` register values
    pub fn from_registers(ctrl_meas: u8, config: u8) -> Self {
        Self {
            oversampling_temperature: Oversampling::from_bits(BITS_OVERSAMP_TMPRT.get(ctrl_meas)),
            oversampling_pressure: Oversampling::from_bits(BITS_OVERSAMP_PRESS.get(ctrl_meas)),
            mode: Mode::from_bits(BITS_MODE.get(ctrl_meas)),
            standby: Standby::from_bits(BITS_STANDBY_TIME.get(config)),
            filter: Filter::from_bits(BITS_FILTER.get(config)),
            spi_wiring: SpiWiring::from_bits(BITS_SPI_WIRING.get(config)),
        }
    }

    /// Overlay the oversampling fields on `ctrl_meas`. The mode bits are
    /// left alone: they are asserted by a separate, final write.
    pub fn encode_ctrl_meas(&self, ctrl_meas: u8) -> u8 {
        let reg = BITS_OVERSAMP_TMPRT.set(ctrl_meas, self.oversampling_temperature as u8);
        BITS_OVERSAMP_PRESS.set(reg, self.oversampling_pressure as u8)
    }

    /// Overlay the mode field on `ctrl_meas`
    pub fn encode_mode(&self, ctrl_meas: u8) -> u8 {
        BITS_MODE.set(ctrl_meas, self.mode as u8)
    }

    /// Overlay standby, filter and wiring on `config`
    pub fn encode_config(&self, config: u8) -> u8 {
        let reg = BITS_STANDBY_TIME.set(config, self.standby as u8);
        let reg = BITS_FILTER.set(reg, self.filter as u8);
        BITS_SPI_WIRING.set(reg, self.spi_wiring as u8)
    }

    /// Minimum delay between two measurements, in whole milliseconds.
    ///
    /// 1000 us start, 2000 us per 1x conversion of each enabled channel,
    /// 500 us pressure setup, plus the standby time. 500 us are added before
    /// the truncating division so the result rounds to nearest.
    pub fn output_data_period_ms(&self) -> u32 {
        let conversions = self.oversampling_pressure.multiplier()
            + self.oversampling_temperature.multiplier();
        let pressure_setup = if self.oversampling_pressure != Oversampling::None {
            ODR_PRESSURE_SETUP_US
        } else {
            0
        };
        let period_us = ODR_START_US
            + ODR_ROUNDING_US
            + ODR_CONVERSION_US * conversions
            + pressure_setup
            + self.standby.period_us();
        period_us / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERSAMPLINGS: [Oversampling; 6] = [
        Oversampling::None,
        Oversampling::X1,
        Oversampling::X2,
        Oversampling::X4,
        Oversampling::X8,
        Oversampling::X16,
    ];
    const STANDBYS: [Standby; 8] = [
        Standby::Ms0_5,
        Standby::Ms62_5,
        Standby::Ms125,
        Standby::Ms250,
        Standby::Ms500,
        Standby::Ms1000,
        Standby::Ms2000,
        Standby::Ms4000,
    ];

    fn options(t: Oversampling, p: Oversampling, standby: Standby) -> Options {
        Options {
            oversampling_temperature: t,
            oversampling_pressure: p,
            standby,
            ..Options::default()
        }
    }

    #[test]
    fn test_multiplier() {
        let expected = [0, 1, 2, 4, 8, 16];
        for (os, want) in OVERSAMPLINGS.iter().zip(expected) {
            assert_eq!(want, os.multiplier(), "{:?}", os);
        }
    }

    #[test]
    fn test_output_data_period_known_values() {
        // 1000 + 500 + 0 + 0 + 500 = 2000 us
        assert_eq!(
            2,
            options(Oversampling::None, Oversampling::None, Standby::Ms0_5).output_data_period_ms()
        );
        // 1500 + 2000 * (16 + 4) + 500 + 1_000_000 = 1_042_000 us
        assert_eq!(
            1042,
            options(Oversampling::X4, Oversampling::X16, Standby::Ms1000).output_data_period_ms()
        );
        // 1500 + 2000 * 2 + 500 + 62500 = 68_500 us
        assert_eq!(
            68,
            options(Oversampling::X1, Oversampling::X1, Standby::Ms62_5).output_data_period_ms()
        );
    }

    #[test]
    fn test_output_data_period_monotonic_in_standby() {
        for t in OVERSAMPLINGS {
            for p in OVERSAMPLINGS {
                let periods: Vec<u32> = STANDBYS
                    .iter()
                    .map(|&sb| options(t, p, sb).output_data_period_ms())
                    .collect();
                assert!(periods.windows(2).all(|w| w[0] <= w[1]), "{:?}", periods);
            }
        }
    }

    #[test]
    fn test_output_data_period_monotonic_in_oversampling() {
        for sb in STANDBYS {
            for fixed in OVERSAMPLINGS {
                let by_temp: Vec<u32> = OVERSAMPLINGS
                    .iter()
                    .map(|&t| options(t, fixed, sb).output_data_period_ms())
                    .collect();
                let by_press: Vec<u32> = OVERSAMPLINGS
                    .iter()
                    .map(|&p| options(fixed, p, sb).output_data_period_ms())
                    .collect();
                assert!(by_temp.windows(2).all(|w| w[0] <= w[1]), "{:?}", by_temp);
                assert!(by_press.windows(2).all(|w| w[0] <= w[1]), "{:?}", by_press);
            }
        }
    }

    #[test]
    fn test_from_registers() {
        // osrs_t x2, osrs_p x16, normal | standby 1000 ms, filter 4, 3-wire
        let opts = Options::from_registers(0b010_101_11, 0b101_010_01);
        assert_eq!(Oversampling::X2, opts.oversampling_temperature);
        assert_eq!(Oversampling::X16, opts.oversampling_pressure);
        assert_eq!(Mode::Normal, opts.mode);
        assert_eq!(Standby::Ms1000, opts.standby);
        assert_eq!(Filter::Coeff4, opts.filter);
        assert_eq!(SpiWiring::ThreeWire, opts.spi_wiring);
    }

    #[test]
    fn test_from_registers_out_of_range_codes() {
        let opts = Options::from_registers(0b111_110_10, 0b000_111_00);
        assert_eq!(Oversampling::X16, opts.oversampling_temperature);
        assert_eq!(Oversampling::X16, opts.oversampling_pressure);
        assert_eq!(Mode::Forced, opts.mode);
        assert_eq!(Filter::Coeff16, opts.filter);
    }

    #[test]
    fn test_encode_keeps_unmanaged_bits() {
        let opts = Options {
            oversampling_temperature: Oversampling::X1,
            oversampling_pressure: Oversampling::X4,
            mode: Mode::Normal,
            standby: Standby::Ms125,
            filter: Filter::Coeff2,
            spi_wiring: SpiWiring::FourWire,
        };
        // mode bits of ctrl_meas untouched until encode_mode
        assert_eq!(0b001_011_00, opts.encode_ctrl_meas(0x00));
        assert_eq!(0b001_011_11, opts.encode_mode(opts.encode_ctrl_meas(0x00)));
        // reserved bit 1 of config survives
        assert_eq!(0b010_001_10, opts.encode_config(0b0000_0010));
    }
}
