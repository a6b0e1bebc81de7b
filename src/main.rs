// Copyright 2025 Au-Zone Technologies Inc.
// SPDX-License-Identifier: Apache-2.0

use envsensor::interface::delay::delay_ms;
use envsensor::{
    Bmp280, DriverError, Filter, I2cInterface, Mode, Oversampling, Sgp30, Standby,
    BMP280_I2C_ADDR_PRIMARY, SGP30_I2C_ADDR,
};

use std::{
    fmt::Debug,
    io::{self, Error, ErrorKind},
};

const I2C_BUS: &str = "/dev/i2c-1";
const SAMPLES: usize = 10;

fn to_io<E: Debug>(e: DriverError<E>) -> io::Error {
    Error::new(ErrorKind::Other, format!("{:?}", e))
}

fn pressure_and_temperature() -> io::Result<()> {
    let i2c = I2cInterface::open(I2C_BUS, BMP280_I2C_ADDR_PRIMARY)?;
    let mut bmp = Bmp280::new_with_interface(i2c);
    if !bmp.is_operational() {
        return Err(Error::new(ErrorKind::NotFound, "BMP280 not operational"));
    }
    println!("BMP280 chip id 0x{:02X}", bmp.chip_id());

    bmp.set_mode(Mode::Normal);
    bmp.set_filter(Filter::Coeff2);
    bmp.set_oversampling_pressure(Oversampling::X16);
    bmp.set_oversampling_temperature(Oversampling::X4);
    bmp.set_standby(Standby::Ms1000);

    let period = bmp.output_data_period().map_err(to_io)?;
    println!("Output data period: {} ms", period);
    for _ in 0..SAMPLES {
        let m = bmp.read_values().map_err(to_io)?;
        println!(
            "Pressure: {:.2} hPa  Temperature: {:.2} C",
            m.pressure / 100.0,
            m.temperature
        );
        delay_ms(period);
    }
    Ok(())
}

fn air_quality() -> io::Result<()> {
    let i2c = I2cInterface::open(I2C_BUS, SGP30_I2C_ADDR)?;
    let mut sgp = Sgp30::new_with_interface(i2c);
    if !sgp.is_operational() {
        return Err(Error::new(ErrorKind::NotFound, "SGP30 not operational"));
    }
    println!(
        "SGP30 serial 0x{:012X}, product type {}, product version 0x{:02X}, {} feature set",
        sgp.serial_id(),
        sgp.product_type(),
        sgp.product_version(),
        sgp.feature_set().name
    );

    sgp.init_air_quality().map_err(to_io)?;
    for _ in 0..SAMPLES {
        // the algorithm expects one measurement per second
        delay_ms(1000);
        let aq = sgp.measure_air_quality().map_err(to_io)?;
        println!("CO2eq: {} ppm  TVOC: {} ppb", aq.co2eq, aq.tvoc);
    }
    Ok(())
}

fn main() -> io::Result<()> {
    env_logger::init();
    pressure_and_temperature()?;
    air_quality()
}
