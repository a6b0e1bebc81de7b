// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

//! Blocking delays used by the default [`SensorInterface`] methods.
//!
//! [`SensorInterface`]: super::SensorInterface

use std::{thread, time::Duration};

/// Pause the calling thread for `ms` milliseconds
pub fn delay_ms(ms: u32) {
    thread::sleep(Duration::from_millis(ms.into()));
}

/// Pause the calling thread for `us` microseconds
pub fn delay_us(us: u32) {
    thread::sleep(Duration::from_micros(us.into()));
}
