//! Factory trim constants.

use log::debug;

use crate::error::{Error, Result};
use crate::registers::*;
use crate::transport::{self, Transport};

/// Trim values burned into the chip at manufacture, unique to each chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationData {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

/// How a field's bytes turn into a value.
#[derive(Debug, Clone, Copy)]
enum Packing {
    U16Le,
    I16Le,
    U8,
    I8,
    /// 12 bits: `byte0` holds [11:4], low nibble of `byte1` holds [3:0].
    H4,
    /// 12 bits: `byte1` holds [11:4], high nibble of `byte0` holds [3:0].
    H5,
}

impl Packing {
    fn len(self) -> usize {
        match self {
            Packing::U8 | Packing::I8 => 1,
            Packing::U16Le | Packing::I16Le | Packing::H4 | Packing::H5 => 2,
        }
    }

    fn decode(self, b: &[u8]) -> i32 {
        match self {
            Packing::U16Le => u16::from_le_bytes([b[0], b[1]]) as i32,
            Packing::I16Le => i16::from_le_bytes([b[0], b[1]]) as i32,
            Packing::U8 => b[0] as i32,
            Packing::I8 => b[0] as i8 as i32,
            // 12-bit, zero-extended.
            Packing::H4 => ((b[0] as i32) << 4) | (b[1] & 0x0F) as i32,
            Packing::H5 => ((b[1] as i32) << 4) | (b[0] >> 4) as i32,
        }
    }
}

struct Field {
    name: &'static str,
    register: u8,
    packing: Packing,
}

const fn field(name: &'static str, register: u8, packing: Packing) -> Field {
    Field {
        name,
        register,
        packing,
    }
}

const FIELD_COUNT: usize = 18;

const FIELDS: [Field; FIELD_COUNT] = [
    field("dig_T1", REG_DIG_T1, Packing::U16Le),
    field("dig_T2", REG_DIG_T2, Packing::I16Le),
    field("dig_T3", REG_DIG_T3, Packing::I16Le),
    field("dig_P1", REG_DIG_P1, Packing::U16Le),
    field("dig_P2", REG_DIG_P2, Packing::I16Le),
    field("dig_P3", REG_DIG_P3, Packing::I16Le),
    field("dig_P4", REG_DIG_P4, Packing::I16Le),
    field("dig_P5", REG_DIG_P5, Packing::I16Le),
    field("dig_P6", REG_DIG_P6, Packing::I16Le),
    field("dig_P7", REG_DIG_P7, Packing::I16Le),
    field("dig_P8", REG_DIG_P8, Packing::I16Le),
    field("dig_P9", REG_DIG_P9, Packing::I16Le),
    field("dig_H1", REG_DIG_H1, Packing::U8),
    field("dig_H2", REG_DIG_H2, Packing::I16Le),
    field("dig_H3", REG_DIG_H3, Packing::U8),
    field("dig_H4", REG_DIG_H4, Packing::H4),
    field("dig_H5", REG_DIG_H5, Packing::H5),
    field("dig_H6", REG_DIG_H6, Packing::I8),
];

impl CalibrationData {
    /// Reads every trim field, one register read each. Nothing is returned
    /// unless all 18 reads complete in full.
    pub fn load<T: Transport + ?Sized>(bus: &mut T) -> Result<Self> {
        let mut values = [0i32; FIELD_COUNT];
        for (field, value) in FIELDS.iter().zip(values.iter_mut()) {
            let mut buf = [0u8; 2];
            let buf = &mut buf[..field.packing.len()];
            transport::read_exact(bus, field.register, buf).map_err(|e| {
                debug!("calibration read of {} failed: {}", field.name, e);
                Error::Calibration(e)
            })?;
            *value = field.packing.decode(buf);
        }

        let calib = Self::from_values(&values);
        debug!(
            "calibration T: {}, {}, {}",
            calib.dig_t1, calib.dig_t2, calib.dig_t3
        );
        debug!(
            "calibration P: {}, {}, {}, {}, {}, {}, {}, {}, {}",
            calib.dig_p1,
            calib.dig_p2,
            calib.dig_p3,
            calib.dig_p4,
            calib.dig_p5,
            calib.dig_p6,
            calib.dig_p7,
            calib.dig_p8,
            calib.dig_p9
        );
        debug!(
            "calibration H: {}, {}, {}, {}, {}, {}",
            calib.dig_h1, calib.dig_h2, calib.dig_h3, calib.dig_h4, calib.dig_h5, calib.dig_h6
        );
        Ok(calib)
    }

    // Values were decoded according to each field's width and signedness,
    // so the narrowing casts are lossless.
    fn from_values(v: &[i32; FIELD_COUNT]) -> Self {
        CalibrationData {
            dig_t1: v[0] as u16,
            dig_t2: v[1] as i16,
            dig_t3: v[2] as i16,
            dig_p1: v[3] as u16,
            dig_p2: v[4] as i16,
            dig_p3: v[5] as i16,
            dig_p4: v[6] as i16,
            dig_p5: v[7] as i16,
            dig_p6: v[8] as i16,
            dig_p7: v[9] as i16,
            dig_p8: v[10] as i16,
            dig_p9: v[11] as i16,
            dig_h1: v[12] as u8,
            dig_h2: v[13] as i16,
            dig_h3: v[14] as u8,
            dig_h4: v[15] as i16,
            dig_h5: v[16] as i16,
            dig_h6: v[17] as i8,
        }
    }
}
