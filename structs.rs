use std::fmt;

use crate::registers::*;

/// Uncompensated ADC codes from one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub pressure: u32,
    pub temperature: u32,
    pub humidity: u32,
}

impl RawSample {
    /// 20-bit code from `msb`, `lsb`, `xlsb[7:4]`.
    pub fn adc20(b: [u8; 3]) -> u32 {
        ((b[0] as u32) << 12) | ((b[1] as u32) << 4) | ((b[2] as u32) >> 4)
    }

    pub fn adc16(b: [u8; 2]) -> u32 {
        ((b[0] as u32) << 8) | b[1] as u32
    }
}

/// Physical values of one measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensatedSample {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Pascal.
    pub pressure: f64,
    /// Percent relative humidity, within 0..=100.
    pub humidity: f64,
}

impl fmt::Display for CompensatedSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} C, {:.2} hPa, {:.2} %",
            self.temperature,
            self.pressure / 100.0,
            self.humidity
        )
    }
}

/// Last configuration written to the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub standby: Standby,
    pub filter: Filter,
    pub osrs_h: Oversampling,
    pub osrs_t: Oversampling,
    pub osrs_p: Oversampling,
    pub mode: Mode,
}

impl DeviceConfig {
    /// All-zero registers, as after power-on or soft reset.
    pub const POWER_ON: DeviceConfig = DeviceConfig {
        standby: Standby::Ms0_5,
        filter: Filter::Off,
        osrs_h: Oversampling::Skip,
        osrs_t: Oversampling::Skip,
        osrs_p: Oversampling::Skip,
        mode: Mode::Sleep,
    };

    /// Register byte for `config`. The 3-wire SPI bit is always cleared.
    pub fn config_bits(&self) -> u8 {
        (self.standby.bits() | self.filter.bits()) & !CONFIG_SPI3W_MASK
    }

    pub fn ctrl_hum_bits(&self) -> u8 {
        self.osrs_h.humidity_bits()
    }

    pub fn ctrl_meas_bits(&self) -> u8 {
        self.osrs_p.pressure_bits() | self.osrs_t.temperature_bits() | self.mode.bits()
    }
}

impl Default for DeviceConfig {
    /// 250 ms standby, filter x16, humidity x8, temperature x1,
    /// pressure x4, normal mode.
    fn default() -> Self {
        DeviceConfig {
            standby: Standby::Ms250,
            filter: Filter::X16,
            osrs_h: Oversampling::X8,
            osrs_t: Oversampling::X1,
            osrs_p: Oversampling::X4,
            mode: Mode::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// A conversion is running.
    pub measuring: bool,
    /// NVM data is being copied to image registers.
    pub im_update: bool,
}

impl Status {
    pub fn from_bits(status: u8) -> Self {
        Status {
            measuring: status & STATUS_MEASURING != 0,
            im_update: status & STATUS_IM_UPDATE != 0,
        }
    }
}
