//! Register-level bus access.
//!
//! A BME280 register access is two steps on the wire: the register address is
//! written, then the payload is transferred. The pair is not atomic, so at
//! most one transaction may be in flight per physical device.

use std::fmt;
use std::str::FromStr;

use rppal::i2c::I2c;

use crate::error::{BusError, Error};
use crate::registers;

const DEVICE_PREFIX: &str = "/dev/i2c-";
const DEFAULT_BUS: u8 = 1;

/// Byte-level access to the sensor's register file.
///
/// Both calls return the number of payload bytes actually transferred. A
/// count lower than requested is not an error at this level; the driver
/// turns it into [`BusError::ShortTransfer`].
pub trait Transport {
    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, BusError>;
    fn write_register(&mut self, register: u8, data: &[u8]) -> Result<usize, BusError>;
}

impl Transport for I2c {
    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, BusError> {
        let written = self.write(&[register])?;
        if written != 1 {
            return Err(BusError::ShortTransfer {
                register,
                requested: 1,
                transferred: written,
            });
        }
        Ok(self.read(buf)?)
    }

    fn write_register(&mut self, register: u8, data: &[u8]) -> Result<usize, BusError> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(register);
        frame.extend_from_slice(data);
        let written = self.write(&frame)?;
        Ok(written.saturating_sub(1))
    }
}

/// Fills `buf` from `register`, failing unless every byte arrived.
pub(crate) fn read_exact<T: Transport + ?Sized>(
    transport: &mut T,
    register: u8,
    buf: &mut [u8],
) -> Result<(), BusError> {
    let transferred = transport.read_register(register, buf)?;
    if transferred != buf.len() {
        return Err(BusError::ShortTransfer {
            register,
            requested: buf.len(),
            transferred,
        });
    }
    Ok(())
}

pub(crate) fn read_byte<T: Transport + ?Sized>(
    transport: &mut T,
    register: u8,
) -> Result<u8, BusError> {
    let mut buf = [0u8; 1];
    read_exact(transport, register, &mut buf)?;
    Ok(buf[0])
}

pub(crate) fn write_byte<T: Transport + ?Sized>(
    transport: &mut T,
    register: u8,
    value: u8,
) -> Result<(), BusError> {
    let transferred = transport.write_register(register, &[value])?;
    if transferred != 1 {
        return Err(BusError::ShortTransfer {
            register,
            requested: 1,
            transferred,
        });
    }
    Ok(())
}

/// Where the sensor lives: the I2C bus number (`/dev/i2c-N`) and the
/// peripheral address on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    pub bus: u8,
    pub address: u16,
}

impl BusConfig {
    pub fn with_bus(bus: u8) -> Self {
        BusConfig {
            bus,
            ..Default::default()
        }
    }
}

impl Default for BusConfig {
    /// `/dev/i2c-1` at `0x76`, the Raspberry Pi user bus.
    fn default() -> Self {
        BusConfig {
            bus: DEFAULT_BUS,
            address: registers::ADDRESS,
        }
    }
}

impl fmt::Display for BusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}@{:#04x}", DEVICE_PREFIX, self.bus, self.address)
    }
}

/// Accepts either a bare bus number (`"3"`) or a device path
/// (`"/dev/i2c-3"`).
impl FromStr for BusConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s.trim();
        let number = number.strip_prefix(DEVICE_PREFIX).unwrap_or(number);
        number
            .parse::<u8>()
            .map(BusConfig::with_bus)
            .map_err(|_| Error::InvalidBus(s.to_owned()))
    }
}

/// Opens the bus and addresses the sensor on it.
pub fn open(config: &BusConfig) -> Result<I2c, BusError> {
    let mut i2c = I2c::with_bus(config.bus)?;
    i2c.set_slave_address(config.address)?;
    Ok(i2c)
}
