//! Sensor session: identity check, calibration, configuration and
//! measurement.

use std::mem;

use log::{debug, info, warn};
use rppal::i2c::I2c;

use crate::calibration::CalibrationData;
use crate::compensation::{
    celsius, compensate_humidity, compensate_pressure, compensate_temperature, pascal,
    relative_humidity,
};
use crate::error::{Error, Result};
use crate::registers::*;
use crate::structs::{CompensatedSample, DeviceConfig, RawSample, Status};
use crate::transport::{self, BusConfig, Transport};

struct Session<T> {
    transport: T,
    calibration: CalibrationData,
    config: DeviceConfig,
}

enum State<T> {
    Uninitialized,
    Ready(Session<T>),
}

/// BME280 driver.
///
/// Starts uninitialized; [`Bme280::init`] or [`Bme280::init_with`] verifies
/// the chip, loads its calibration and writes [`DeviceConfig::default`].
/// Every other operation fails with [`Error::NotInitialized`] until then.
///
/// All operations block on the bus and take `&mut self`. Sharing a sensor
/// between threads needs external locking, since a register access is an
/// address write followed by a transfer with nothing making the pair atomic.
pub struct Bme280<T> {
    state: State<T>,
}

impl Bme280<I2c> {
    /// Opens the I2C bus described by `config` and initializes the sensor on
    /// it.
    pub fn init(&mut self, config: &BusConfig) -> Result<()> {
        debug!("opening {}", config);
        let i2c = transport::open(config).map_err(Error::DeviceNotFound)?;
        self.init_with(i2c)
    }
}

impl<T: Transport> Bme280<T> {
    pub fn new() -> Self {
        Bme280 {
            state: State::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Initializes the sensor behind an already opened transport. On failure
    /// the transport is dropped and the driver stays uninitialized.
    pub fn init_with(&mut self, transport: T) -> Result<()> {
        if self.deinit().is_some() {
            debug!("re-initializing, previous session released");
        }
        let session = Session::open(transport)?;
        info!(
            "BME280 ready (standby {:?}, filter {:?}, mode {:?})",
            session.config.standby, session.config.filter, session.config.mode
        );
        self.state = State::Ready(session);
        Ok(())
    }

    /// Releases the transport. Returns `None` if there was no session.
    pub fn deinit(&mut self) -> Option<T> {
        match mem::replace(&mut self.state, State::Uninitialized) {
            State::Ready(session) => {
                debug!("BME280 session closed");
                Some(session.transport)
            }
            State::Uninitialized => None,
        }
    }

    pub fn calibration(&self) -> Option<&CalibrationData> {
        match &self.state {
            State::Ready(session) => Some(&session.calibration),
            State::Uninitialized => None,
        }
    }

    /// Last configuration written to the chip.
    pub fn config(&self) -> Option<&DeviceConfig> {
        match &self.state {
            State::Ready(session) => Some(&session.config),
            State::Uninitialized => None,
        }
    }

    /// Reads the latest conversion and compensates it. A pressure that
    /// cannot be compensated fails the whole measurement.
    pub fn measure(&mut self) -> Result<CompensatedSample> {
        let session = self.session()?;
        let raw = session.read_raw()?;
        let calib = &session.calibration;

        let (centi, t_fine) = compensate_temperature(raw.temperature, calib);
        let pressure = compensate_pressure(raw.pressure, calib, t_fine)?;
        let humidity = compensate_humidity(raw.humidity, calib, t_fine);

        Ok(CompensatedSample {
            temperature: celsius(centi),
            pressure: pascal(pressure),
            humidity: relative_humidity(humidity),
        })
    }

    pub fn get_config(&mut self) -> Result<(Standby, Filter)> {
        let config = self.session()?.read(REG_CONFIG)?;
        Ok((Standby::from_bits(config), Filter::from_bits(config)))
    }

    pub fn get_ctrl_hum(&mut self) -> Result<Oversampling> {
        let ctrl_hum = self.session()?.read(REG_CTRL_HUM)?;
        Ok(Oversampling::from_humidity_bits(ctrl_hum))
    }

    /// Returns pressure oversampling, temperature oversampling and mode.
    pub fn get_ctrl_meas(&mut self) -> Result<(Oversampling, Oversampling, Mode)> {
        let ctrl_meas = self.session()?.read(REG_CTRL_MEAS)?;
        Ok((
            Oversampling::from_pressure_bits(ctrl_meas),
            Oversampling::from_temperature_bits(ctrl_meas),
            Mode::from_bits(ctrl_meas),
        ))
    }

    pub fn get_status(&mut self) -> Result<Status> {
        let status = self.session()?.read(REG_STATUS)?;
        Ok(Status::from_bits(status))
    }

    pub fn get_chip_id(&mut self) -> Result<u8> {
        self.session()?.read(REG_ID)
    }

    pub fn set_config(&mut self, standby: Standby, filter: Filter) -> Result<()> {
        let session = self.session()?;
        let config = DeviceConfig {
            standby,
            filter,
            ..session.config
        };
        session.write(REG_CONFIG, config.config_bits())?;
        session.config = config;
        Ok(())
    }

    pub fn set_ctrl_hum(&mut self, osrs_h: Oversampling) -> Result<()> {
        let session = self.session()?;
        let config = DeviceConfig {
            osrs_h,
            ..session.config
        };
        session.write(REG_CTRL_HUM, config.ctrl_hum_bits())?;
        session.config = config;
        Ok(())
    }

    pub fn set_ctrl_meas(
        &mut self,
        osrs_p: Oversampling,
        osrs_t: Oversampling,
        mode: Mode,
    ) -> Result<()> {
        let session = self.session()?;
        let config = DeviceConfig {
            osrs_p,
            osrs_t,
            mode,
            ..session.config
        };
        session.write(REG_CTRL_MEAS, config.ctrl_meas_bits())?;
        session.config = config;
        Ok(())
    }

    /// Changes the power mode, keeping the last written oversampling.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        let config = self.session()?.config;
        self.set_ctrl_meas(config.osrs_p, config.osrs_t, mode)
    }

    /// Resets the chip to its power-on register values. Calibration is
    /// retained.
    pub fn soft_reset(&mut self) -> Result<()> {
        let session = self.session()?;
        session.write(REG_RESET, RESET_COMMAND)?;
        session.config = DeviceConfig::POWER_ON;
        info!("BME280 soft reset");
        Ok(())
    }

    fn session(&mut self) -> Result<&mut Session<T>> {
        match &mut self.state {
            State::Ready(session) => Ok(session),
            State::Uninitialized => Err(Error::NotInitialized),
        }
    }
}

impl<T: Transport> Default for Bme280<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Session<T> {
    fn open(mut bus: T) -> Result<Self> {
        let id = transport::read_byte(&mut bus, REG_ID).map_err(Error::DeviceNotFound)?;
        if id != CHIP_ID {
            warn!("chip id {:#04x} does not match {:#04x}", id, CHIP_ID);
            return Err(Error::DeviceMismatch { found: id });
        }

        let calibration = CalibrationData::load(&mut bus)?;
        let mut session = Session {
            transport: bus,
            calibration,
            config: DeviceConfig::POWER_ON,
        };
        session.write_config(DeviceConfig::default()).map_err(|e| {
            warn!("could not set default config: {}", e);
            e
        })?;
        Ok(session)
    }

    // ctrl_hum only takes effect on the next ctrl_meas write, so it goes first.
    fn write_config(&mut self, config: DeviceConfig) -> Result<()> {
        self.write(REG_CONFIG, config.config_bits())?;
        self.write(REG_CTRL_HUM, config.ctrl_hum_bits())?;
        self.write(REG_CTRL_MEAS, config.ctrl_meas_bits())?;
        self.config = config;
        Ok(())
    }

    fn read(&mut self, register: u8) -> Result<u8> {
        transport::read_byte(&mut self.transport, register).map_err(Error::Transport)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<()> {
        transport::write_byte(&mut self.transport, register, value).map_err(Error::Config)
    }

    fn read_raw(&mut self) -> Result<RawSample> {
        let mut temp = [0u8; REG_TEMP_LEN];
        let mut press = [0u8; REG_PRESS_LEN];
        let mut hum = [0u8; REG_HUM_LEN];
        transport::read_exact(&mut self.transport, REG_TEMP_MSB, &mut temp)
            .map_err(Error::Transport)?;
        transport::read_exact(&mut self.transport, REG_PRESS_MSB, &mut press)
            .map_err(Error::Transport)?;
        transport::read_exact(&mut self.transport, REG_HUM_MSB, &mut hum)
            .map_err(Error::Transport)?;

        Ok(RawSample {
            pressure: RawSample::adc20(press),
            temperature: RawSample::adc20(temp),
            humidity: RawSample::adc16(hum),
        })
    }
}
