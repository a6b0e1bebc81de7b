// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Linux spidev backend for [`SpiInterface`](super::SpiInterface).

use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use std::io;
use std::path::Path;

/// BMP280 accepts up to 10 MHz; stay well below for long wires
const SPI_MAX_SPEED_HZ: u32 = 1_000_000;

/// Blocking full-duplex transfer
pub trait Transfer {
    /// Error type
    type Error;

    /// Clock out `tx` while clocking `rx.len()` bytes in. Both slices have
    /// the same length.
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Self::Error>;
}

/// Blocking write
pub trait Write {
    /// Error type
    type Error;

    /// Sends `words` to the slave, ignoring all the incoming words
    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error>;
}

pub struct SpiDevice {
    spi: Spidev,
}

impl SpiDevice {
    /// Open and configure `/dev/spidevX.Y` for the BMP280 (mode 0, MSB first)
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<SpiDevice> {
        let mut spi = Spidev::open(path)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(SPI_MAX_SPEED_HZ)
            .mode(SpiModeFlags::SPI_MODE_0)
            .lsb_first(false)
            .build();
        spi.configure(&options)?;

        Ok(SpiDevice { spi })
    }
}

impl Transfer for SpiDevice {
    type Error = io::Error;

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Self::Error> {
        let mut transfer = SpidevTransfer::read_write(tx, rx);
        self.spi.transfer(&mut transfer)
    }
}

impl Write for SpiDevice {
    type Error = io::Error;

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut transfer = SpidevTransfer::write(words);
        self.spi.transfer(&mut transfer)
    }
}
