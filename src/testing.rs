//! Simulated register file used by the unit tests.

use core::convert::Infallible;

use crate::interface::{As3935Interface, Binding};
use crate::interface::i2c::ADDRESS_DEFAULT;
use crate::registers::REG_MAX;

const REGISTER_COUNT: usize = REG_MAX as usize + 1;
const LOG_CAPACITY: usize = 64;

/// Register file that records every bus access.
pub struct FakeInterface {
    pub registers: [u8; REGISTER_COUNT],
    pub acknowledge: bool,
    pub binding: Binding,
    writes: [(u8, u8); LOG_CAPACITY],
    write_count: usize,
    read_log: [u8; LOG_CAPACITY],
    read_count: usize,
    probes: usize,
}

impl FakeInterface {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            acknowledge: true,
            binding: Binding::I2c {
                address: ADDRESS_DEFAULT,
            },
            writes: [(0, 0); LOG_CAPACITY],
            write_count: 0,
            read_log: [0; LOG_CAPACITY],
            read_count: 0,
            probes: 0,
        }
    }

    /// Every `(register, value)` written so far, in order.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes[..self.write_count.min(LOG_CAPACITY)]
    }

    /// Values written to `register`, in order.
    pub fn writes_to(&self, register: u8) -> impl Iterator<Item = u8> + '_ {
        self.writes()
            .iter()
            .filter(move |(reg, _)| *reg == register)
            .map(|(_, value)| *value)
    }

    /// Register addresses read so far, in order.
    pub fn read_log(&self) -> &[u8] {
        &self.read_log[..self.read_count.min(LOG_CAPACITY)]
    }

    pub fn reads(&self) -> usize {
        self.read_count
    }

    pub fn probes(&self) -> usize {
        self.probes
    }

    /// Total number of bus transactions of any kind.
    pub fn transactions(&self) -> usize {
        self.read_count + self.write_count + self.probes
    }

    pub fn clear_log(&mut self) {
        self.write_count = 0;
        self.read_count = 0;
        self.probes = 0;
    }
}

impl As3935Interface for FakeInterface {
    type Error = Infallible;

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        if self.write_count < LOG_CAPACITY {
            self.writes[self.write_count] = (register, value);
        }
        self.write_count += 1;
        self.registers[register as usize] = value;
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        if self.read_count < LOG_CAPACITY {
            self.read_log[self.read_count] = register;
        }
        self.read_count += 1;
        Ok(self.registers[register as usize])
    }

    fn probe(&mut self) -> Result<bool, Self::Error> {
        self.probes += 1;
        Ok(self.acknowledge)
    }

    fn binding(&self) -> Binding {
        self.binding
    }
}
