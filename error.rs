use std::io;

use thiserror::Error;

/// Failure of a single register transaction on the bus.
#[derive(Debug, Error)]
pub enum BusError {
    #[error(transparent)]
    I2c(#[from] rppal::i2c::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// Fewer bytes moved than the transaction asked for.
    #[error("short transfer at register {register:#04x}: {transferred} of {requested} bytes")]
    ShortTransfer {
        register: u8,
        requested: usize,
        transferred: usize,
    },
}

/// Everything a driver operation can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error("BME280 not reachable on the bus")]
    DeviceNotFound(#[source] BusError),

    #[error("chip id {found:#04x} does not match BME280 ({:#04x})", crate::registers::CHIP_ID)]
    DeviceMismatch { found: u8 },

    #[error("failed to read calibration data")]
    Calibration(#[source] BusError),

    #[error("failed to write configuration")]
    Config(#[source] BusError),

    #[error("register transfer failed")]
    Transport(#[source] BusError),

    #[error("pressure undefined: compensation divisor is zero")]
    PressureUndefined,

    #[error("device not initialized")]
    NotInitialized,

    #[error("invalid i2c bus identifier `{0}`")]
    InvalidBus(String),
}

/// Field-less discriminant of [`Error`], for callers that only branch on
/// the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DeviceNotFound,
    DeviceMismatch,
    Calibration,
    Config,
    Transport,
    PressureUndefined,
    NotInitialized,
    InvalidBus,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DeviceNotFound(_) => ErrorKind::DeviceNotFound,
            Error::DeviceMismatch { .. } => ErrorKind::DeviceMismatch,
            Error::Calibration(_) => ErrorKind::Calibration,
            Error::Config(_) => ErrorKind::Config,
            Error::Transport(_) => ErrorKind::Transport,
            Error::PressureUndefined => ErrorKind::PressureUndefined,
            Error::NotInitialized => ErrorKind::NotInitialized,
            Error::InvalidBus(_) => ErrorKind::InvalidBus,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
