use std::env;
use std::process;

use anyhow::{Context, Result};
use log::{debug, error};
use rppal::i2c::I2c;

use rpbme280::{Bme280, BusConfig};

// Consulted when no bus is given on the command line.
const BUS_ENV: &str = "BME280_BUS";

fn bus_config() -> Result<BusConfig> {
    match env::args().nth(1).or_else(|| env::var(BUS_ENV).ok()) {
        Some(bus) => parse_bus(&bus),
        None => Ok(BusConfig::default()),
    }
}

fn parse_bus(bus: &str) -> Result<BusConfig> {
    bus.parse()
        .with_context(|| format!("parsing bus identifier {:?}", bus))
}

fn run() -> Result<()> {
    let config = bus_config()?;
    let mut bme: Bme280<I2c> = Bme280::new();
    bme.init(&config)
        .with_context(|| format!("initializing BME280 on {}", config))?;

    let chip_id = bme.get_chip_id()?;
    let (standby, filter) = bme.get_config()?;
    debug!(
        "chip id {:#04x}, standby {:?}, filter {:?}",
        chip_id, standby, filter
    );

    let sample = bme.measure().context("measuring")?;
    println!("Temperature: {:.2} C", sample.temperature);
    println!("Humidity: {:.2} %", sample.humidity);
    println!("Pressure: {:.2} hPa", sample.pressure / 100.0);

    bme.deinit();
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{:#}", e);
        process::exit(1);
    }
}
