//! Register map definitions for the AS3935 lightning sensor.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::DivisionRatio;

/// Register address of `AFE_GAIN` (gain boost, power-down).
pub const REG_AFE_GAIN: u8 = 0x00;
/// Register address of `THRESHOLD` (watchdog threshold, noise floor).
pub const REG_THRESHOLD: u8 = 0x01;
/// Register address of `LIGHTNING_REG` (spike rejection, strike count, statistics).
pub const REG_LIGHTNING: u8 = 0x02;
/// Register address of `INT_MASK_ANT` (interrupt, disturber mask, division ratio).
pub const REG_INT_MASK_ANT: u8 = 0x03;
/// Register address of `S_LIG_L`.
pub const REG_ENERGY_LSB: u8 = 0x04;
/// Register address of `S_LIG_M`.
pub const REG_ENERGY_MSB: u8 = 0x05;
/// Register address of `S_LIG_MM`.
pub const REG_ENERGY_MMSB: u8 = 0x06;
/// Register address of `DISTANCE`.
pub const REG_DISTANCE: u8 = 0x07;
/// Register address of `FREQ_DISP_IRQ` (oscillator display, tuning capacitors).
pub const REG_FREQ_DISP_IRQ: u8 = 0x08;
/// Register address of `CALIB_TRCO` status.
pub const REG_CALIB_TRCO: u8 = 0x3A;
/// Register address of `CALIB_SRCO` status.
pub const REG_CALIB_SRCO: u8 = 0x3B;
/// Register address of `PRESET_DEFAULT`.
pub const REG_PRESET_DEFAULT: u8 = 0x3C;
/// Register address of `CALIB_RCO`.
pub const REG_CALIB_RCO: u8 = 0x3D;

/// Highest register address of the sensor.
pub const REG_MAX: u8 = REG_CALIB_RCO;

/// Direct command value written to `PRESET_DEFAULT` or `CALIB_RCO`.
pub const DIRECT_COMMAND: u8 = 0x96;

/// Bitfield representation of the `INT_MASK_ANT` register (address `0x03`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptStatus {
    // INT_NH, noise level too high (bit 0).
    pub noise_high: bool,
    #[skip]
    __: B1,
    // INT_D, disturber detected (bit 2).
    pub disturber: bool,
    // INT_L, lightning detected (bit 3).
    pub lightning: bool,
    #[skip]
    __: B1,
    // MASK_DIST (bit 5).
    pub mask_disturber: bool,
    // LCO_FDIV (bits 7:6).
    pub division_ratio: DivisionRatio,
}

impl From<u8> for InterruptStatus {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<InterruptStatus> for u8 {
    fn from(value: InterruptStatus) -> Self {
        value.into_bytes()[0]
    }
}
