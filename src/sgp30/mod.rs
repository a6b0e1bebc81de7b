// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sensirion SGP30 multi-pixel gas sensor driver.
//!
//! Every exchange with the chip is a command: a 2-byte opcode, optionally
//! followed by argument words, then after the command's execution time a
//! reply of CRC protected words. [`Sgp30::start`] and [`Sgp30::get_values`]
//! expose the two halves so a caller can do other work while the chip is
//! busy; [`Sgp30::run`] chains them with the required delay.
//!
//! At most one command is outstanding. Starting another one before the reply
//! was fetched abandons the first: its reply is lost.

pub mod crc;
pub mod features;

use crate::{
    constants::{
        BASELINE_VALIDITY_SECS, COMMAND_DELAY_MARGIN_US, HUMIDITY_LIMIT_MG_M3, MAX_COMMAND_ARGS,
        MAX_REPLY_VALUES, RX_BUF_LEN, SELF_TEST_PASS, TX_BUF_LEN, VERSION_PRODUCT_TYPE_MASK,
        VERSION_PRODUCT_VERSION_MASK, WORD_FRAME_LEN,
    },
    interface::SensorInterface,
    DriverError,
};
use crc::checksum;
use features::{Command, CommandId, FeatureSet};
use log::{debug, trace, warn};

/// Version of this driver
pub const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Air quality signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirQuality {
    /// CO2 equivalent, ppm
    pub co2eq: u16,
    /// Total volatile organic compounds, ppb
    pub tvoc: u16,
}

/// Raw sensor signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSignals {
    pub h2: u16,
    pub ethanol: u16,
}

/// Baseline of the air quality algorithm, opaque to the host.
///
/// Store it with a timestamp and restore it after a restart while
/// [`baseline_is_fresh`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub co2eq: u16,
    pub tvoc: u16,
}

/// Command state of the driver
#[derive(Debug, Clone, Copy, Default)]
pub enum RunningCommand {
    #[default]
    Idle,
    /// Command written, reply not fetched yet
    AwaitingReply(&'static Command),
}

impl RunningCommand {
    fn id(&self) -> Option<CommandId> {
        match self {
            RunningCommand::Idle => None,
            RunningCommand::AwaitingReply(command) => Some(command.id),
        }
    }
}

/// Absolute humidity in mg/m^3 from relative humidity (percent) and
/// temperature (degrees Celsius), August-Roche-Magnus approximation.
pub fn absolute_humidity(relative_humidity: f64, temperature: f64) -> f64 {
    let vapor = (relative_humidity / 100.0)
        * 6.112
        * ((17.62 * temperature) / (243.12 + temperature)).exp();
    (216_700.0 * (vapor / (273.15 + temperature))).round()
}

/// Humidity compensation word: 8.8 fixed point g/m^3
fn humidity_word(mg_m3: u32) -> u16 {
    ((mg_m3 << 8) / 1000) as u16
}

/// Is a baseline stored at `stamp` still worth restoring at `now`.
///
/// Both are seconds on the same clock. A stamp from the future is rejected.
pub fn baseline_is_fresh(stamp: u64, now: u64) -> bool {
    now.checked_sub(stamp)
        .map_or(false, |age| age <= BASELINE_VALIDITY_SECS)
}

/// SGP30 driver
pub struct Sgp30<SI> {
    sensor_interface: SI,
    running: RunningCommand,
    feature_set: &'static FeatureSet,
    serial_id: u64,
    feature_set_version: u16,
    operational: bool,
    /// Decoded values of the last reply
    values: [u16; MAX_REPLY_VALUES],
}

impl<SI> Sgp30<SI> {
    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// 48-bit serial number
    pub fn serial_id(&self) -> u64 {
        self.serial_id
    }

    pub fn feature_set_version(&self) -> u16 {
        self.feature_set_version
    }

    /// Product type, bits 15:12 of the feature set version
    pub fn product_type(&self) -> u8 {
        ((self.feature_set_version & VERSION_PRODUCT_TYPE_MASK) >> 12) as u8
    }

    /// Product version, bits 7:0 of the feature set version
    pub fn product_version(&self) -> u8 {
        (self.feature_set_version & VERSION_PRODUCT_VERSION_MASK) as u8
    }

    pub fn feature_set(&self) -> &'static FeatureSet {
        self.feature_set
    }

    pub fn running_command(&self) -> RunningCommand {
        self.running
    }

    /// Returns previously consumed sensor interface instance.
    pub fn free(self) -> SI {
        self.sensor_interface
    }
}

impl<SI, SE> Sgp30<SI>
where
    SI: SensorInterface<SensorError = SE>,
    SE: core::fmt::Debug,
{
    /// Read the serial id and the feature set version, then select the
    /// command set.
    ///
    /// Never fails: check [`Sgp30::is_operational`] afterwards.
    pub fn new_with_interface(sensor_interface: SI) -> Self {
        let mut driver = Self {
            sensor_interface,
            running: RunningCommand::Idle,
            feature_set: &features::NULL,
            serial_id: 0,
            feature_set_version: 0,
            operational: false,
            values: [0; MAX_REPLY_VALUES],
        };
        match driver.init() {
            Ok(()) => driver.operational = true,
            Err(e) => warn!("SGP30 initialization failed: {:?}", e),
        }
        driver
    }

    fn init(&mut self) -> Result<(), DriverError<SE>> {
        let serial_id = match self.execute(CommandId::GetSerialId, &[])? {
            &[w1, w2, w3] => (u64::from(w1) << 32) | (u64::from(w2) << 16) | u64::from(w3),
            _ => 0,
        };
        self.serial_id = serial_id;
        debug!("SGP30 serial id 0x{:012X}", self.serial_id);

        let version = self.execute(CommandId::GetFeatureSetVersion, &[])?[0];
        self.feature_set_version = version;
        self.feature_set = FeatureSet::select(version);
        debug!(
            "SGP30 feature set version 0x{:04X}, using {} command set",
            version, self.feature_set.name
        );
        Ok(())
    }

    /// Send a command with up to two argument words.
    ///
    /// The command becomes the one awaiting a reply, replacing any command
    /// whose reply was never fetched.
    pub fn start(
        &mut self,
        id: CommandId,
        args: &[u16],
    ) -> Result<&'static Command, DriverError<SE>> {
        if !self.operational {
            return Err(DriverError::NotOperational);
        }
        self.issue(id, args)
    }

    /// Fetch the reply of the command awaiting one.
    ///
    /// `id` must name that command. On a checksum failure the command stays
    /// awaiting its reply.
    pub fn get_values(&mut self, id: CommandId) -> Result<&[u16], DriverError<SE>> {
        if !self.operational {
            return Err(DriverError::NotOperational);
        }
        self.fetch(id)
    }

    /// `start`, wait for the command's execution time, then `get_values`
    pub fn run(&mut self, id: CommandId, args: &[u16]) -> Result<&[u16], DriverError<SE>> {
        if !self.operational {
            return Err(DriverError::NotOperational);
        }
        self.execute(id, args)
    }

    fn issue(&mut self, id: CommandId, args: &[u16]) -> Result<&'static Command, DriverError<SE>> {
        let command = self
            .feature_set
            .command(id)
            .ok_or(DriverError::UnsupportedCommand(id))?;
        if args.len() > MAX_COMMAND_ARGS {
            return Err(DriverError::TooManyArguments(args.len()));
        }

        let mut frame = [0u8; TX_BUF_LEN];
        frame[..2].copy_from_slice(&command.code);
        let mut len = 2;
        for arg in args {
            let word = arg.to_be_bytes();
            frame[len..len + 2].copy_from_slice(&word);
            frame[len + 2] = checksum(&word);
            len += WORD_FRAME_LEN;
        }

        trace!("start {} {:02X?}", command.name, &frame[..len]);
        self.sensor_interface
            .write(&frame[..len])
            .map_err(DriverError::CommError)?;

        if let RunningCommand::AwaitingReply(previous) = self.running {
            warn!("{} abandoned, reply never fetched", previous.name);
        }
        self.running = RunningCommand::AwaitingReply(command);
        Ok(command)
    }

    fn fetch(&mut self, id: CommandId) -> Result<&[u16], DriverError<SE>> {
        let command = match self.running {
            RunningCommand::AwaitingReply(command) if command.id == id => command,
            running => {
                return Err(DriverError::CommandMismatch {
                    requested: id,
                    running: running.id(),
                })
            }
        };

        let count = command.values_count();
        if count == 0 {
            self.running = RunningCommand::Idle;
            return Ok(&[]);
        }

        let mut buf = [0u8; RX_BUF_LEN];
        let reply = &mut buf[..count * WORD_FRAME_LEN];
        self.sensor_interface
            .read(reply)
            .map_err(DriverError::CommError)?;
        trace!("{} reply {:02X?}", command.name, reply);

        let mut values = [0u16; MAX_REPLY_VALUES];
        for ((frame, value), decoder) in reply
            .chunks_exact(WORD_FRAME_LEN)
            .zip(values.iter_mut())
            .zip(command.values)
        {
            let expected = checksum(&frame[..2]);
            if frame[2] != expected {
                warn!("{}: checksum mismatch on {}", command.name, decoder.name);
                return Err(DriverError::ChecksumMismatch {
                    expected,
                    received: frame[2],
                });
            }
            *value = (decoder.decode)([frame[0], frame[1]]);
        }

        self.values = values;
        self.running = RunningCommand::Idle;
        Ok(&self.values[..count])
    }

    fn execute(&mut self, id: CommandId, args: &[u16]) -> Result<&[u16], DriverError<SE>> {
        let command = self.issue(id, args)?;
        self.sensor_interface
            .delay_us(command.duration_us + COMMAND_DELAY_MARGIN_US);
        self.fetch(id)
    }

    /// Start the air quality algorithm. This resets the baseline.
    pub fn init_air_quality(&mut self) -> Result<(), DriverError<SE>> {
        self.run(CommandId::InitAirQuality, &[])?;
        Ok(())
    }

    pub fn measure_air_quality(&mut self) -> Result<AirQuality, DriverError<SE>> {
        let v = self.run(CommandId::MeasureAirQuality, &[])?;
        Ok(AirQuality {
            co2eq: v[0],
            tvoc: v[1],
        })
    }

    /// First half of [`Sgp30::measure_air_quality`]
    pub fn start_air_quality(&mut self) -> Result<(), DriverError<SE>> {
        self.start(CommandId::MeasureAirQuality, &[])?;
        Ok(())
    }

    /// Second half of [`Sgp30::measure_air_quality`]
    pub fn get_air_quality(&mut self) -> Result<AirQuality, DriverError<SE>> {
        let v = self.get_values(CommandId::MeasureAirQuality)?;
        Ok(AirQuality {
            co2eq: v[0],
            tvoc: v[1],
        })
    }

    pub fn measure_raw_signals(&mut self) -> Result<RawSignals, DriverError<SE>> {
        let v = self.run(CommandId::MeasureRawSignals, &[])?;
        Ok(RawSignals {
            h2: v[0],
            ethanol: v[1],
        })
    }

    pub fn start_raw_signals(&mut self) -> Result<(), DriverError<SE>> {
        self.start(CommandId::MeasureRawSignals, &[])?;
        Ok(())
    }

    pub fn get_raw_signals(&mut self) -> Result<RawSignals, DriverError<SE>> {
        let v = self.get_values(CommandId::MeasureRawSignals)?;
        Ok(RawSignals {
            h2: v[0],
            ethanol: v[1],
        })
    }

    /// Run the on-chip self test and return its raw result word
    pub fn measure_test(&mut self) -> Result<u16, DriverError<SE>> {
        Ok(self.run(CommandId::MeasureTest, &[])?[0])
    }

    /// True when the self test reports 0xD400
    pub fn self_test(&mut self) -> Result<bool, DriverError<SE>> {
        let result = self.measure_test()?;
        if result != SELF_TEST_PASS {
            warn!("SGP30 self test returned 0x{:04X}", result);
        }
        Ok(result == SELF_TEST_PASS)
    }

    pub fn get_baseline(&mut self) -> Result<Baseline, DriverError<SE>> {
        let v = self.run(CommandId::GetBaseline, &[])?;
        Ok(Baseline {
            co2eq: v[0],
            tvoc: v[1],
        })
    }

    /// Restore a baseline. The chip expects tvoc first.
    pub fn set_baseline(&mut self, baseline: Baseline) -> Result<(), DriverError<SE>> {
        self.run(CommandId::SetBaseline, &[baseline.tvoc, baseline.co2eq])?;
        Ok(())
    }

    /// Set the absolute humidity used for compensation, in mg/m^3.
    ///
    /// Must be below 256000. Zero disables compensation.
    pub fn set_humidity(&mut self, mg_m3: u32) -> Result<(), DriverError<SE>> {
        if mg_m3 >= HUMIDITY_LIMIT_MG_M3 {
            return Err(DriverError::HumidityOutOfRange(f64::from(mg_m3)));
        }
        self.run(CommandId::SetHumidity, &[humidity_word(mg_m3)])?;
        Ok(())
    }

    /// Set the humidity compensation from relative humidity (percent) and
    /// temperature (degrees Celsius)
    pub fn set_relative_humidity(
        &mut self,
        relative_humidity: f64,
        temperature: f64,
    ) -> Result<(), DriverError<SE>> {
        let ah = absolute_humidity(relative_humidity, temperature);
        if !ah.is_finite() || ah < 0.0 || ah >= f64::from(HUMIDITY_LIMIT_MG_M3) {
            return Err(DriverError::HumidityOutOfRange(ah));
        }
        self.set_humidity(ah as u32)
    }
}
