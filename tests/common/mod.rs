// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scripted transport shared by the driver tests.
//!
//! The mock keeps a 256 byte register file for register-addressed reads and
//! writes, a queue of raw replies for plain reads, and an ordered log of
//! every bus event. Delays are recorded, never slept.

#![allow(dead_code)]

use envsensor::SensorInterface;
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write(Vec<u8>),
    /// Register address as sent, length
    ReadRegister(u8, usize),
    Read(usize),
    DelayUs(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedFault;

#[derive(Debug)]
pub struct MockState {
    pub spi: bool,
    pub regs: [u8; 256],
    pub replies: VecDeque<Vec<u8>>,
    pub events: Vec<Event>,
    /// Zero-based indices of write calls that fail
    pub failing_writes: Vec<usize>,
    /// Number of upcoming register reads that fail
    pub failing_register_reads: usize,
    writes_seen: usize,
}

impl MockState {
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn delays_us(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::DelayUs(us) => Some(*us),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    /// Register index an address on the wire refers to
    fn register(&self, addr: u8) -> usize {
        if self.spi {
            usize::from(addr | 0x80)
        } else {
            usize::from(addr)
        }
    }
}

/// Cloneable handle: the driver owns one clone, the test keeps another
#[derive(Debug, Clone)]
pub struct MockInterface {
    state: Rc<RefCell<MockState>>,
}

impl MockInterface {
    pub fn new(spi: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                spi,
                regs: [0; 256],
                replies: VecDeque::new(),
                events: Vec::new(),
                failing_writes: Vec::new(),
                failing_register_reads: 0,
                writes_seen: 0,
            })),
        }
    }

    pub fn i2c() -> Self {
        Self::new(false)
    }

    pub fn spi() -> Self {
        Self::new(true)
    }

    pub fn state(&self) -> std::cell::RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    pub fn set_regs(&self, start: u8, bytes: &[u8]) {
        let start = usize::from(start);
        self.state().regs[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn reg(&self, addr: u8) -> u8 {
        self.state().regs[usize::from(addr)]
    }

    pub fn queue_reply(&self, bytes: Vec<u8>) {
        self.state().replies.push_back(bytes);
    }

    /// Queue a reply of CRC framed words
    pub fn queue_words(&self, words: &[u16]) {
        self.queue_reply(frame(words));
    }

    pub fn clear_events(&self) {
        self.state().events.clear();
    }
}

impl SensorInterface for MockInterface {
    type SensorError = InjectedFault;

    fn is_spi(&self) -> bool {
        self.state.borrow().spi
    }

    fn delay_us(&mut self, micros: u32) {
        self.state().events.push(Event::DelayUs(micros));
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::SensorError> {
        let mut st = self.state();
        st.events.push(Event::Write(bytes.to_vec()));
        let index = st.writes_seen;
        st.writes_seen += 1;
        if st.failing_writes.contains(&index) {
            return Err(InjectedFault);
        }
        // register/value pairs, a soft reset puts the chip to sleep
        for pair in bytes.chunks_exact(2) {
            let reg = st.register(pair[0]);
            if reg == 0xE0 && pair[1] == 0xB6 {
                st.regs[0xF4] &= !0x03;
            } else {
                st.regs[reg] = pair[1];
            }
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::SensorError> {
        let mut st = self.state();
        st.events.push(Event::Read(buf.len()));
        // an idle bus reads as all ones
        buf.fill(0xFF);
        if let Some(reply) = st.replies.pop_front() {
            let n = reply.len().min(buf.len());
            buf[..n].copy_from_slice(&reply[..n]);
        }
        Ok(())
    }

    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::SensorError> {
        let mut st = self.state();
        st.events.push(Event::ReadRegister(reg, buf.len()));
        if st.failing_register_reads > 0 {
            st.failing_register_reads -= 1;
            return Err(InjectedFault);
        }
        let start = st.register(reg);
        buf.copy_from_slice(&st.regs[start..start + buf.len()]);
        Ok(())
    }
}

/// Bitwise CRC-8, polynomial 0x131, seed 0xFF
pub fn crc8(bytes: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &b in bytes {
        crc ^= b;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x31 } else { crc << 1 };
        }
    }
    crc
}

/// Words as the SGP30 sends them: big-endian, each followed by its CRC
pub fn frame(words: &[u16]) -> Vec<u8> {
    words
        .iter()
        .flat_map(|w| {
            let b = w.to_be_bytes();
            [b[0], b[1], crc8(&b)]
        })
        .collect()
}
