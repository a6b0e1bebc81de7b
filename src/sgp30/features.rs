// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! SGP30 command catalogue and the firmware dependent feature sets.
//!
//! Each chip reports a feature set version word. The newest feature set
//! compatible with that word decides which commands the driver may issue.
//! The identification and self test commands are available in every set.

use crate::constants::{
    VERSION_MAJOR_MASK, VERSION_MINOR_MASK, VERSION_PRODUCT_TYPE_MASK, VERSION_RESERVED_MASK,
};

/// Command identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    InitAirQuality,
    MeasureAirQuality,
    GetBaseline,
    SetBaseline,
    SetHumidity,
    MeasureTest,
    GetFeatureSetVersion,
    MeasureRawSignals,
    GetSerialId,
}

fn big_endian(wire: [u8; 2]) -> u16 {
    u16::from_be_bytes(wire)
}

/// One 16-bit reply value
#[derive(Debug)]
pub struct Value {
    pub name: &'static str,
    /// Wire bytes to host value
    pub decode: fn([u8; 2]) -> u16,
}

/// Static description of a command
#[derive(Debug)]
pub struct Command {
    pub name: &'static str,
    pub id: CommandId,
    /// Opcode as sent, most significant byte first
    pub code: [u8; 2],
    /// Documented execution time in microseconds
    pub duration_us: u32,
    pub values: &'static [Value],
}

impl Command {
    /// Number of 16-bit values in the reply
    pub fn values_count(&self) -> usize {
        self.values.len()
    }
}

const CO2EQ: Value = Value { name: "co2eq", decode: big_endian };
const TVOC: Value = Value { name: "tvoc", decode: big_endian };
const H2: Value = Value { name: "h2", decode: big_endian };
const ETHANOL: Value = Value { name: "ethanol", decode: big_endian };
const ID_1: Value = Value { name: "id1", decode: big_endian };
const ID_2: Value = Value { name: "id2", decode: big_endian };
const ID_3: Value = Value { name: "id3", decode: big_endian };
const VERSION: Value = Value { name: "version", decode: big_endian };
const TEST: Value = Value { name: "test", decode: big_endian };

pub static INIT_AIR_QUALITY: Command = Command {
    name: "iaq_init",
    id: CommandId::InitAirQuality,
    code: [0x20, 0x03],
    duration_us: 10_000,
    values: &[],
};

pub static MEASURE_AIR_QUALITY: Command = Command {
    name: "iaq_measure",
    id: CommandId::MeasureAirQuality,
    code: [0x20, 0x08],
    duration_us: 50_000,
    values: &[CO2EQ, TVOC],
};

pub static GET_BASELINE: Command = Command {
    name: "iaq_get_baseline",
    id: CommandId::GetBaseline,
    code: [0x20, 0x15],
    duration_us: 10_000,
    values: &[CO2EQ, TVOC],
};

pub static SET_BASELINE: Command = Command {
    name: "iaq_set_baseline",
    id: CommandId::SetBaseline,
    code: [0x20, 0x1E],
    duration_us: 10_000,
    values: &[],
};

pub static MEASURE_RAW_SIGNALS: Command = Command {
    name: "measure_signals",
    id: CommandId::MeasureRawSignals,
    code: [0x20, 0x50],
    duration_us: 200_000,
    values: &[H2, ETHANOL],
};

pub static SET_HUMIDITY: Command = Command {
    name: "set_absolute_humidity",
    id: CommandId::SetHumidity,
    code: [0x20, 0x61],
    duration_us: 10_000,
    values: &[],
};

pub static GET_SERIAL_ID: Command = Command {
    name: "get_serial_id",
    id: CommandId::GetSerialId,
    code: [0x36, 0x82],
    duration_us: 500,
    values: &[ID_1, ID_2, ID_3],
};

pub static GET_FEATURE_SET_VERSION: Command = Command {
    name: "get_feature_set_version",
    id: CommandId::GetFeatureSetVersion,
    code: [0x20, 0x2F],
    duration_us: 1_000,
    values: &[VERSION],
};

pub static MEASURE_TEST: Command = Command {
    name: "measure_test",
    id: CommandId::MeasureTest,
    code: [0x20, 0x32],
    duration_us: 220_000,
    values: &[TEST],
};

/// Commands a chip with a given feature set version understands
#[derive(Debug)]
pub struct FeatureSet {
    pub name: &'static str,
    commands: &'static [&'static Command],
    /// Versions this set was written for
    versions: &'static [u16],
}

pub static EXTENDED: FeatureSet = FeatureSet {
    name: "extended",
    commands: &[
        &INIT_AIR_QUALITY,
        &MEASURE_AIR_QUALITY,
        &GET_BASELINE,
        &SET_BASELINE,
        &MEASURE_RAW_SIGNALS,
        &SET_HUMIDITY,
    ],
    versions: &[0x0020],
};

pub static LEGACY: FeatureSet = FeatureSet {
    name: "legacy",
    commands: &[
        &INIT_AIR_QUALITY,
        &MEASURE_AIR_QUALITY,
        &GET_BASELINE,
        &SET_BASELINE,
        &MEASURE_RAW_SIGNALS,
    ],
    versions: &[0x0009],
};

pub static NULL: FeatureSet = FeatureSet {
    name: "null",
    commands: &[],
    versions: &[],
};

/// Newest first, so the richest compatible set wins
static FEATURE_SETS: [&FeatureSet; 2] = [&EXTENDED, &LEGACY];

/// Does a chip reporting `version` understand a set written for `fs_version`
fn is_compatible(fs_version: u16, version: u16) -> bool {
    (fs_version & VERSION_PRODUCT_TYPE_MASK) == (version & VERSION_PRODUCT_TYPE_MASK)
        && (version & VERSION_RESERVED_MASK) == 0
        && (fs_version & VERSION_MAJOR_MASK) == (version & VERSION_MAJOR_MASK)
        && (version & VERSION_MINOR_MASK) >= (fs_version & VERSION_MINOR_MASK)
}

impl FeatureSet {
    /// Pick the newest feature set compatible with `version`, or [`NULL`]
    pub fn select(version: u16) -> &'static FeatureSet {
        FEATURE_SETS
            .iter()
            .copied()
            .find(|set| set.versions.iter().any(|&fs| is_compatible(fs, version)))
            .unwrap_or(&NULL)
    }

    /// Look up a command.
    ///
    /// Identification and self test resolve in every set, the others only
    /// when the set lists them.
    pub fn command(&self, id: CommandId) -> Option<&'static Command> {
        match id {
            CommandId::GetSerialId => Some(&GET_SERIAL_ID),
            CommandId::GetFeatureSetVersion => Some(&GET_FEATURE_SET_VERSION),
            CommandId::MeasureTest => Some(&MEASURE_TEST),
            _ => self.commands.iter().copied().find(|c| c.id == id),
        }
    }
}
