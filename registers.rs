//! BME280 register map and setting encodings.
//!
//! cf. https://trac.switch-science.com/wiki/BME280

// BME280 I2C default slave address (SDO tied low).
pub const ADDRESS: u16 = 0x76;
pub const CHIP_ID: u8 = 0x60;

// Identity and control registers.
pub const REG_ID: u8 = 0xD0;
pub const REG_RESET: u8 = 0xE0;
pub const RESET_COMMAND: u8 = 0xB6;
pub const REG_CTRL_HUM: u8 = 0xF2;
pub const REG_STATUS: u8 = 0xF3;
pub const REG_CTRL_MEAS: u8 = 0xF4;
pub const REG_CONFIG: u8 = 0xF5;

// ADC data registers, MSB first.
pub const REG_PRESS_MSB: u8 = 0xF7;
pub const REG_PRESS_LEN: usize = 3;
pub const REG_TEMP_MSB: u8 = 0xFA;
pub const REG_TEMP_LEN: usize = 3;
pub const REG_HUM_MSB: u8 = 0xFD;
pub const REG_HUM_LEN: usize = 2;

// Calibration block.
pub const REG_DIG_T1: u8 = 0x88;
pub const REG_DIG_T2: u8 = 0x8A;
pub const REG_DIG_T3: u8 = 0x8C;
pub const REG_DIG_P1: u8 = 0x8E;
pub const REG_DIG_P2: u8 = 0x90;
pub const REG_DIG_P3: u8 = 0x92;
pub const REG_DIG_P4: u8 = 0x94;
pub const REG_DIG_P5: u8 = 0x96;
pub const REG_DIG_P6: u8 = 0x98;
pub const REG_DIG_P7: u8 = 0x9A;
pub const REG_DIG_P8: u8 = 0x9C;
pub const REG_DIG_P9: u8 = 0x9E;
pub const REG_DIG_H1: u8 = 0xA1;
pub const REG_DIG_H2: u8 = 0xE1;
pub const REG_DIG_H3: u8 = 0xE3;
pub const REG_DIG_H4: u8 = 0xE4;
pub const REG_DIG_H5: u8 = 0xE5;
pub const REG_DIG_H6: u8 = 0xE7;

// config: t_sb[7:5] | filter[4:2] | spi3w_en[0]
pub const CONFIG_STANDBY_MASK: u8 = 0xE0;
pub const CONFIG_FILTER_MASK: u8 = 0x1C;
pub const CONFIG_SPI3W_MASK: u8 = 0x01;

// ctrl_hum: osrs_h[2:0]
pub const CTRL_HUM_OSRS_MASK: u8 = 0x07;
pub const CTRL_HUM_OSRS_POS: u8 = 0;

// ctrl_meas: osrs_t[7:5] | osrs_p[4:2] | mode[1:0]
pub const CTRL_MEAS_OSRS_T_MASK: u8 = 0xE0;
pub const CTRL_MEAS_OSRS_T_POS: u8 = 5;
pub const CTRL_MEAS_OSRS_P_MASK: u8 = 0x1C;
pub const CTRL_MEAS_OSRS_P_POS: u8 = 2;
pub const CTRL_MEAS_MODE_MASK: u8 = 0x03;

// status
pub const STATUS_MEASURING: u8 = 0x08;
pub const STATUS_IM_UPDATE: u8 = 0x01;

/// Inactive duration between measurements in normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standby {
    Ms0_5,
    Ms62_5,
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
    Ms10,
    Ms20,
}

impl Standby {
    /// Register bits, already positioned in `config[7:5]`.
    pub fn bits(self) -> u8 {
        match self {
            Standby::Ms0_5 => 0x00,
            Standby::Ms62_5 => 0x20,
            Standby::Ms125 => 0x40,
            Standby::Ms250 => 0x60,
            Standby::Ms500 => 0x80,
            Standby::Ms1000 => 0xA0,
            Standby::Ms10 => 0xC0,
            Standby::Ms20 => 0xE0,
        }
    }

    pub fn from_bits(config: u8) -> Self {
        match config & CONFIG_STANDBY_MASK {
            0x00 => Standby::Ms0_5,
            0x20 => Standby::Ms62_5,
            0x40 => Standby::Ms125,
            0x60 => Standby::Ms250,
            0x80 => Standby::Ms500,
            0xA0 => Standby::Ms1000,
            0xC0 => Standby::Ms10,
            _ => Standby::Ms20,
        }
    }
}

/// IIR filter coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Off,
    X2,
    X4,
    X8,
    X16,
}

impl Filter {
    /// Register bits, already positioned in `config[4:2]`.
    pub fn bits(self) -> u8 {
        match self {
            Filter::Off => 0x00,
            Filter::X2 => 0x04,
            Filter::X4 => 0x08,
            Filter::X8 => 0x0C,
            Filter::X16 => 0x10,
        }
    }

    /// Codes above 4 are treated as ×16 by the chip.
    pub fn from_bits(config: u8) -> Self {
        match config & CONFIG_FILTER_MASK {
            0x00 => Filter::Off,
            0x04 => Filter::X2,
            0x08 => Filter::X4,
            0x0C => Filter::X8,
            _ => Filter::X16,
        }
    }
}

/// Oversampling for one channel. The same 3-bit code is used by the
/// humidity, pressure and temperature fields, at different bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oversampling {
    Skip,
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl Oversampling {
    pub fn code(self) -> u8 {
        match self {
            Oversampling::Skip => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 3,
            Oversampling::X8 => 4,
            Oversampling::X16 => 5,
        }
    }

    /// Codes 6 and 7 are treated as ×16 by the chip.
    pub fn from_code(code: u8) -> Self {
        match code & 0x07 {
            0 => Oversampling::Skip,
            1 => Oversampling::X1,
            2 => Oversampling::X2,
            3 => Oversampling::X4,
            4 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }

    pub fn humidity_bits(self) -> u8 {
        (self.code() << CTRL_HUM_OSRS_POS) & CTRL_HUM_OSRS_MASK
    }

    pub fn pressure_bits(self) -> u8 {
        (self.code() << CTRL_MEAS_OSRS_P_POS) & CTRL_MEAS_OSRS_P_MASK
    }

    pub fn temperature_bits(self) -> u8 {
        (self.code() << CTRL_MEAS_OSRS_T_POS) & CTRL_MEAS_OSRS_T_MASK
    }

    pub fn from_humidity_bits(ctrl_hum: u8) -> Self {
        Self::from_code((ctrl_hum & CTRL_HUM_OSRS_MASK) >> CTRL_HUM_OSRS_POS)
    }

    pub fn from_pressure_bits(ctrl_meas: u8) -> Self {
        Self::from_code((ctrl_meas & CTRL_MEAS_OSRS_P_MASK) >> CTRL_MEAS_OSRS_P_POS)
    }

    pub fn from_temperature_bits(ctrl_meas: u8) -> Self {
        Self::from_code((ctrl_meas & CTRL_MEAS_OSRS_T_MASK) >> CTRL_MEAS_OSRS_T_POS)
    }
}

/// Sensor power mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sleep,
    Forced,
    Normal,
}

impl Mode {
    pub fn bits(self) -> u8 {
        match self {
            Mode::Sleep => 0x00,
            Mode::Forced => 0x01,
            Mode::Normal => 0x03,
        }
    }

    /// Both `01` and `10` select forced mode.
    pub fn from_bits(ctrl_meas: u8) -> Self {
        match ctrl_meas & CTRL_MEAS_MODE_MASK {
            0x00 => Mode::Sleep,
            0x03 => Mode::Normal,
            _ => Mode::Forced,
        }
    }
}
