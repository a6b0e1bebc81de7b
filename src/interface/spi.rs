// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! [`SensorInterface`] over a 4-wire SPI bus.
//!
//! Each call is one chip-select cycle. Register reads clock the address byte
//! out and the data back in a single full-duplex transfer.

use super::spidev::{SpiDevice, Transfer, Write};
use super::SensorInterface;
use log::trace;
use std::io;
use std::path::Path;

/// SPI peripheral wrapped as a sensor transport
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI, CommE> SpiInterface<SPI>
where
    SPI: Write<Error = CommE> + Transfer<Error = CommE>,
    CommE: core::fmt::Debug,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Returns previously consumed SPI peripheral.
    pub fn free(self) -> SPI {
        self.spi
    }
}

impl SpiInterface<SpiDevice> {
    /// Open `/dev/spidevX.Y`
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(SpiDevice::new(path)?))
    }
}

impl<SPI, CommE> SensorInterface for SpiInterface<SPI>
where
    SPI: Write<Error = CommE> + Transfer<Error = CommE>,
    CommE: core::fmt::Debug,
{
    type SensorError = CommE;

    fn is_spi(&self) -> bool {
        true
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::SensorError> {
        trace!("spi write {:02x?}", bytes);
        self.spi.write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::SensorError> {
        let tx = vec![0u8; buf.len()];
        self.spi.transfer(&tx, buf)
    }

    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::SensorError> {
        let mut tx = vec![0u8; buf.len() + 1];
        tx[0] = reg;
        let mut rx = vec![0u8; tx.len()];
        self.spi.transfer(&tx, &mut rx)?;
        // first byte was clocked in while the address went out
        buf.copy_from_slice(&rx[1..]);
        trace!("spi read 0x{:02X}: {:02x?}", reg, buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Loopback-ish fake: answers every transfer with a fixed pattern and
    /// keeps what was sent.
    struct FakeSpi {
        sent: Vec<Vec<u8>>,
        answer: Vec<u8>,
    }

    impl Transfer for FakeSpi {
        type Error = ();
        fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), ()> {
            self.sent.push(tx.to_vec());
            rx.copy_from_slice(&self.answer[..rx.len()]);
            Ok(())
        }
    }

    impl Write for FakeSpi {
        type Error = ();
        fn write(&mut self, words: &[u8]) -> Result<(), ()> {
            self.sent.push(words.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_read_register_drops_address_slot() {
        let mut spi = SpiInterface::new(FakeSpi {
            sent: Vec::new(),
            answer: vec![0xFF, 0x58, 0x01, 0x02],
        });
        let mut buf = [0u8; 3];
        spi.read_register(0xD0 | 0x80, &mut buf).unwrap();
        assert_eq!([0x58, 0x01, 0x02], buf);
        let fake = spi.free();
        assert_eq!(vec![vec![0xD0, 0, 0, 0]], fake.sent);
    }

    #[test]
    fn test_spi_reports_alternate_addressing() {
        let spi = SpiInterface::new(FakeSpi {
            sent: Vec::new(),
            answer: Vec::new(),
        });
        assert!(spi.is_spi());
    }
}
