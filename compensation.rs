//! Integer compensation from the BME280 datasheet.
//!
//! Temperature must be compensated first: its [`TFine`] output is an input to
//! both pressure and humidity, and can only be obtained from
//! [`compensate_temperature`].

use std::convert::TryFrom;

use log::warn;

use crate::calibration::CalibrationData;
use crate::error::{Error, Result};

/// Upper clamp of the humidity accumulator, 100 %RH in Q22.10 before `>> 12`.
const HUMIDITY_MAX: i64 = 419_430_400;

/// Fine-resolution temperature carried into pressure and humidity
/// compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TFine(i32);

impl TFine {
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Returns the temperature in hundredths of a degree Celsius.
pub fn compensate_temperature(raw: u32, calib: &CalibrationData) -> (i32, TFine) {
    let adc = raw as i64;
    let t1 = calib.dig_t1 as i64;
    let t2 = calib.dig_t2 as i64;
    let t3 = calib.dig_t3 as i64;

    let var1 = (((adc >> 3) - (t1 << 1)) * t2) >> 11;
    let delta = (adc >> 4) - t1;
    let var2 = (((delta * delta) >> 12) * t3) >> 14;
    let t_fine = (var1 + var2) as i32;
    let centi = ((t_fine as i64 * 5 + 128) >> 8) as i32;
    (centi, TFine(t_fine))
}

/// Returns the pressure in Pa as unsigned Q24.8.
///
/// Fails with [`Error::PressureUndefined`] when the divisor is zero, or when
/// the trims push an intermediate out of 64-bit range or the result out of
/// Q24.8.
pub fn compensate_pressure(raw: u32, calib: &CalibrationData, t_fine: TFine) -> Result<u32> {
    let (var1, var2) = pressure_terms(calib, t_fine)
        .ok_or_else(|| pressure_undefined("offset terms overflow", calib, t_fine))?;
    if var1 == 0 {
        return Err(pressure_undefined("zero divisor", calib, t_fine));
    }
    pressure_q24_8(raw, calib, var1, var2)
        .ok_or_else(|| pressure_undefined("pressure out of range", calib, t_fine))
}

fn pressure_undefined(reason: &str, calib: &CalibrationData, t_fine: TFine) -> Error {
    warn!(
        "pressure compensation: {} (t_fine {}, dig_P1 {})",
        reason, t_fine.0, calib.dig_p1
    );
    Error::PressureUndefined
}

// Divisor and offset term. Left shifts of signed values are written as
// multiplications so overflow is caught.
fn pressure_terms(calib: &CalibrationData, t_fine: TFine) -> Option<(i64, i64)> {
    let p1 = calib.dig_p1 as i64;
    let p2 = calib.dig_p2 as i64;
    let p3 = calib.dig_p3 as i64;
    let p4 = calib.dig_p4 as i64;
    let p5 = calib.dig_p5 as i64;
    let p6 = calib.dig_p6 as i64;

    let var1 = t_fine.0 as i64 - 128_000;
    let var2 = var1
        .checked_mul(var1)?
        .checked_mul(p6)?
        .checked_add(var1.checked_mul(p5)?.checked_mul(1 << 17)?)?
        .checked_add(p4 << 35)?;
    let var1 = (var1.checked_mul(var1)?.checked_mul(p3)? >> 8)
        .checked_add(var1.checked_mul(p2)?.checked_mul(1 << 12)?)?;
    let var1 = (1i64 << 47).checked_add(var1)?.checked_mul(p1)? >> 33;
    Some((var1, var2))
}

fn pressure_q24_8(raw: u32, calib: &CalibrationData, var1: i64, var2: i64) -> Option<u32> {
    let p7 = calib.dig_p7 as i64;
    let p8 = calib.dig_p8 as i64;
    let p9 = calib.dig_p9 as i64;

    let p = 1_048_576 - raw as i64;
    let p = p
        .checked_mul(1 << 31)?
        .checked_sub(var2)?
        .checked_mul(3125)?
        .checked_div(var1)?;
    let var1 = p9.checked_mul(p >> 13)?.checked_mul(p >> 13)? >> 25;
    let var2 = p8.checked_mul(p)? >> 19;
    let p = (p.checked_add(var1)?.checked_add(var2)? >> 8).checked_add(p7 << 4)?;
    u32::try_from(p).ok()
}

/// Returns relative humidity in %RH as unsigned Q22.10, within 0..=102400.
///
/// Products saturate, so trims far outside the chip's range clamp to 0 or
/// 100 %RH instead of wrapping.
pub fn compensate_humidity(raw: u32, calib: &CalibrationData, t_fine: TFine) -> u32 {
    let adc = raw as i64;
    let h1 = calib.dig_h1 as i64;
    let h2 = calib.dig_h2 as i64;
    let h3 = calib.dig_h3 as i64;
    let h4 = calib.dig_h4 as i64;
    let h5 = calib.dig_h5 as i64;
    let h6 = calib.dig_h6 as i64;

    let v = t_fine.0 as i64 - 76_800;
    let offset = ((adc << 14) - (h4 << 20) - h5 * v + 16_384) >> 15;
    let scale = ((v * h6) >> 10).saturating_mul(((v * h3) >> 11) + 32_768) >> 10;
    let scale = (scale.saturating_add(2_097_152).saturating_mul(h2).saturating_add(8_192)) >> 14;
    let acc = offset.saturating_mul(scale);
    let square = (acc >> 15).saturating_mul(acc >> 15) >> 7;
    let acc = acc.saturating_sub(square.saturating_mul(h1) >> 4);
    let acc = acc.max(0).min(HUMIDITY_MAX);
    (acc >> 12) as u32
}

pub fn celsius(centi: i32) -> f64 {
    centi as f64 / 100.0
}

pub fn pascal(q24_8: u32) -> f64 {
    q24_8 as f64 / 256.0
}

pub fn relative_humidity(q22_10: u32) -> f64 {
    q22_10 as f64 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::reference_calibration;

    const RAW_T: u32 = 519_888;
    const RAW_P: u32 = 415_148;
    const RAW_H: u32 = 30_000;

    #[test]
    fn reference_temperature() {
        let (centi, t_fine) = compensate_temperature(RAW_T, &reference_calibration());
        assert_eq!(t_fine.value(), 128_422);
        assert_eq!(centi, 2508);
        assert_eq!(celsius(centi), 25.08);
    }

    #[test]
    fn reference_pressure() {
        let p = compensate_pressure(RAW_P, &reference_calibration(), TFine(128_422)).unwrap();
        assert_eq!(p, 25_767_233);
        assert_eq!(pascal(p), 100_653.253_906_25);
    }

    #[test]
    fn reference_humidity() {
        let h = compensate_humidity(RAW_H, &reference_calibration(), TFine(128_422));
        assert_eq!(h, 56_317);
        assert_eq!(relative_humidity(h), 54.997_070_312_5);
    }

    #[test]
    fn compensation_is_pure() {
        let calib = reference_calibration();
        let first = compensate_temperature(RAW_T, &calib);
        assert_eq!(compensate_temperature(RAW_T, &calib), first);

        let t_fine = first.1;
        assert_eq!(
            compensate_pressure(RAW_P, &calib, t_fine).unwrap(),
            compensate_pressure(RAW_P, &calib, t_fine).unwrap()
        );
        assert_eq!(
            compensate_humidity(RAW_H, &calib, t_fine),
            compensate_humidity(RAW_H, &calib, t_fine)
        );
    }

    #[test]
    fn temperature_is_monotonic_in_raw_code() {
        let mut calib = reference_calibration();
        calib.dig_t3 = 50;
        let (mut last_centi, mut last_fine) = compensate_temperature(0, &calib);
        for raw in 1..(1u32 << 20) {
            let (centi, t_fine) = compensate_temperature(raw, &calib);
            assert!(t_fine.value() >= last_fine.value(), "t_fine fell at {}", raw);
            assert!(centi >= last_centi, "temperature fell at {}", raw);
            last_centi = centi;
            last_fine = t_fine;
        }
    }

    #[test]
    fn zero_p1_leaves_pressure_undefined() {
        let mut calib = reference_calibration();
        calib.dig_p1 = 0;
        let err = compensate_pressure(RAW_P, &calib, TFine(128_422)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PressureUndefined);
    }

    #[test]
    fn cancelling_cross_term_leaves_pressure_undefined() {
        // (t_fine - 128000) * P2 << 12 == -2^47 cancels the offset term.
        let mut calib = reference_calibration();
        calib.dig_p2 = i16::MIN;
        calib.dig_p3 = 0;
        let t_fine = TFine(128_000 + (1 << 20));
        let err = compensate_pressure(RAW_P, &calib, t_fine).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PressureUndefined);
    }

    #[test]
    fn tiny_divisor_overflow_leaves_pressure_undefined() {
        // var1 == 16384, so p overflows in the P9 term.
        let mut calib = reference_calibration();
        calib.dig_p1 = 1;
        let err = compensate_pressure(0, &calib, TFine(128_422)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PressureUndefined);
    }

    #[test]
    fn corner_pressure_trims_never_panic() {
        let t_fines = [TFine(i32::MIN), TFine(0), TFine(128_422), TFine(i32::MAX)];
        for mask in 0..(1u32 << 8) {
            let mut calib = reference_calibration();
            let corner = |bit: u32| if mask & (1 << bit) != 0 { i16::MAX } else { i16::MIN };
            calib.dig_p2 = corner(0);
            calib.dig_p3 = corner(1);
            calib.dig_p4 = corner(2);
            calib.dig_p5 = corner(3);
            calib.dig_p6 = corner(4);
            calib.dig_p7 = corner(5);
            calib.dig_p8 = corner(6);
            calib.dig_p9 = corner(7);
            for &p1 in [1u16, u16::MAX].iter() {
                calib.dig_p1 = p1;
                for &t_fine in t_fines.iter() {
                    for &raw in [0u32, RAW_P, (1 << 20) - 1].iter() {
                        if let Err(e) = compensate_pressure(raw, &calib, t_fine) {
                            assert_eq!(e.kind(), ErrorKind::PressureUndefined);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn humidity_clamps_at_both_extremes() {
        let calib = reference_calibration();
        let t_fine = TFine(128_422);
        assert_eq!(compensate_humidity(0, &calib, t_fine), 0);
        assert_eq!(compensate_humidity(65_535, &calib, t_fine), 102_400);
        assert_eq!(relative_humidity(102_400), 100.0);
    }

    #[test]
    fn humidity_stays_in_range() {
        let mut sensitive = reference_calibration();
        sensitive.dig_h1 = 0;
        sensitive.dig_h2 = 1000;
        sensitive.dig_h4 = -200;
        sensitive.dig_h6 = -40;

        for calib in [reference_calibration(), sensitive].iter() {
            for &t_fine in [TFine(40_000), TFine(128_422), TFine(200_000)].iter() {
                for raw in 0..=u16::MAX as u32 {
                    let rh = relative_humidity(compensate_humidity(raw, calib, t_fine));
                    assert!((0.0..=100.0).contains(&rh), "{} at raw {}", rh, raw);
                }
            }
        }
    }

    #[test]
    fn corner_humidity_trims_stay_in_range() {
        let t_fines = [
            TFine(i32::MIN),
            TFine(-4_000_000),
            TFine(128_422),
            TFine(4_000_000),
            TFine(i32::MAX),
        ];
        for mask in 0..(1u32 << 6) {
            let bit = |b: u32| mask & (1 << b) != 0;
            let mut calib = reference_calibration();
            calib.dig_h1 = if bit(0) { u8::MAX } else { 0 };
            calib.dig_h2 = if bit(1) { i16::MAX } else { i16::MIN };
            calib.dig_h3 = if bit(2) { u8::MAX } else { 0 };
            calib.dig_h4 = if bit(3) { 4095 } else { 0 };
            calib.dig_h5 = if bit(4) { 4095 } else { 0 };
            calib.dig_h6 = if bit(5) { i8::MAX } else { i8::MIN };
            for &t_fine in t_fines.iter() {
                for &raw in [0u32, 32_768, 65_535].iter() {
                    let h = compensate_humidity(raw, &calib, t_fine);
                    assert!(h <= 102_400, "{} for {:?} at {:?}", h, calib, t_fine);
                }
            }
        }
    }
}
