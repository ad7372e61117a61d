//! Driver for the Bosch BME280 temperature, pressure and humidity sensor on a
//! Linux I2C bus.
//!
//! ```no_run
//! use rppal::i2c::I2c;
//! use rpbme280::{Bme280, BusConfig};
//!
//! let mut bme: Bme280<I2c> = Bme280::new();
//! bme.init(&BusConfig::default())?;
//! let sample = bme.measure()?;
//! println!("{}", sample);
//! # Ok::<(), rpbme280::Error>(())
//! ```
//!
//! The driver does no locking of its own: a [`Bme280`] is a single session
//! with the chip and all of its operations block the caller on the bus.

pub mod calibration;
pub mod compensation;
pub mod device;
pub mod error;
pub mod registers;
pub mod structs;
pub mod transport;

#[cfg(test)]
mod testing;

pub use calibration::CalibrationData;
pub use compensation::TFine;
pub use device::Bme280;
pub use error::{BusError, Error, ErrorKind, Result};
pub use registers::{Filter, Mode, Oversampling, Standby};
pub use structs::{CompensatedSample, DeviceConfig, RawSample, Status};
pub use transport::{BusConfig, Transport};
