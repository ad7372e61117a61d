//! In-memory BME280 register file for unit tests.

use std::collections::HashSet;
use std::io;

use crate::calibration::CalibrationData;
use crate::error::BusError;
use crate::transport::Transport;

/// 0x88..=0x9F: T1..T3, P1..P9 from the Bosch reference example.
pub const CALIB_TP: [u8; 24] = [
    0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, 0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B, 0x8C, 0x00,
    0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17,
];
/// 0xA1: H1.
pub const CALIB_H1: u8 = 0x4B;
/// 0xE1..=0xE7: H2, H3, H4/H5 interleaved, H6.
pub const CALIB_H: [u8; 7] = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];
/// 0xF7..=0xFE: press 415148, temp 519888, hum 30000.
pub const ADC_DATA: [u8; 8] = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30];

pub fn reference_calibration() -> CalibrationData {
    CalibrationData {
        dig_t1: 27504,
        dig_t2: 26435,
        dig_t3: -1000,
        dig_p1: 36477,
        dig_p2: -10685,
        dig_p3: 3024,
        dig_p4: 2855,
        dig_p5: 140,
        dig_p6: -7,
        dig_p7: 15500,
        dig_p8: -14600,
        dig_p9: 6000,
        dig_h1: 75,
        dig_h2: 362,
        dig_h3: 0,
        dig_h4: 313,
        dig_h5: 50,
        dig_h6: 30,
    }
}

pub struct FakeBus {
    registers: [u8; 256],
    reads: Vec<u8>,
    writes: Vec<(u8, Vec<u8>)>,
    failing_reads: HashSet<u8>,
    short_reads: HashSet<u8>,
    failing_writes: HashSet<u8>,
    short_writes: HashSet<u8>,
}

impl FakeBus {
    pub fn new() -> Self {
        FakeBus {
            registers: [0; 256],
            reads: Vec::new(),
            writes: Vec::new(),
            failing_reads: HashSet::new(),
            short_reads: HashSet::new(),
            failing_writes: HashSet::new(),
            short_writes: HashSet::new(),
        }
    }

    /// A powered-up BME280 holding the reference calibration and one
    /// conversion result.
    pub fn bme280() -> Self {
        let mut bus = FakeBus::new();
        bus.set(0xD0, &[0x60]);
        bus.set(0x88, &CALIB_TP);
        bus.set(0xA1, &[CALIB_H1]);
        bus.set(0xE1, &CALIB_H);
        bus.set(0xF7, &ADC_DATA);
        bus
    }

    pub fn set(&mut self, register: u8, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.registers[(register as usize + i) & 0xFF] = *b;
        }
    }

    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    /// Register addresses of every read, in order.
    pub fn reads(&self) -> &[u8] {
        &self.reads
    }

    pub fn writes(&self) -> &[(u8, Vec<u8>)] {
        &self.writes
    }

    pub fn fail_read_at(&mut self, register: u8) {
        self.failing_reads.insert(register);
    }

    pub fn short_read_at(&mut self, register: u8) {
        self.short_reads.insert(register);
    }

    pub fn fail_write_at(&mut self, register: u8) {
        self.failing_writes.insert(register);
    }

    /// Writes to `register` report one byte fewer and leave it untouched.
    pub fn short_write_at(&mut self, register: u8) {
        self.short_writes.insert(register);
    }
}

fn nack() -> BusError {
    BusError::Io(io::Error::new(io::ErrorKind::Other, "nack"))
}

impl Transport for FakeBus {
    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, BusError> {
        self.reads.push(register);
        if self.failing_reads.contains(&register) {
            return Err(nack());
        }
        let len = if self.short_reads.contains(&register) {
            buf.len().saturating_sub(1)
        } else {
            buf.len()
        };
        for (i, b) in buf.iter_mut().take(len).enumerate() {
            *b = self.registers[(register as usize + i) & 0xFF];
        }
        Ok(len)
    }

    fn write_register(&mut self, register: u8, data: &[u8]) -> Result<usize, BusError> {
        self.writes.push((register, data.to_vec()));
        if self.failing_writes.contains(&register) {
            return Err(nack());
        }
        if self.short_writes.contains(&register) {
            return Ok(data.len().saturating_sub(1));
        }
        self.set(register, data);
        Ok(data.len())
    }
}
