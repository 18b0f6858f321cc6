//! Strongly typed parameter enumerations for the AS3935 driver.
//!
//! Several fields of the sensor accept a discrete set of physical values that
//! do not map linearly onto their bit pattern. Each enum below is the lookup
//! table between the two: `from_*` rejects anything outside the documented set
//! and `code`/`from_code` translate to and from the raw field value.
//!
//! # Examples
//!
//! ```rust
//! use as3935::params::{DivisionRatio, StrikeThreshold};
//!
//! assert_eq!(StrikeThreshold::from_strikes(9), Some(StrikeThreshold::Nine));
//! assert_eq!(StrikeThreshold::from_strikes(4), None);
//! assert_eq!(DivisionRatio::Div64.ratio(), 64);
//! ```

use modular_bitfield::prelude::Specifier;

/// Analog front-end gain preset (`AFE_GAIN[5:1]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Environment {
    /// Indoor gain boost, `0b10010`.
    Indoor,
    /// Outdoor gain boost, `0b01110`.
    Outdoor,
}

impl Environment {
    /// Returns the raw AFE gain code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Indoor => 0b1_0010,
            Self::Outdoor => 0b0_1110,
        }
    }

    /// Decodes an AFE gain code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b1_0010 => Some(Self::Indoor),
            0b0_1110 => Some(Self::Outdoor),
            _ => None,
        }
    }
}

/// Number of strikes within 15 minutes required before an interrupt
/// (`LIGHTNING_REG[5:4]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrikeThreshold {
    /// Single strike.
    One,
    /// Five strikes.
    Five,
    /// Nine strikes.
    Nine,
    /// Sixteen strikes.
    Sixteen,
}

impl StrikeThreshold {
    /// Maps a strike count onto its threshold setting.
    pub const fn from_strikes(strikes: u8) -> Option<Self> {
        match strikes {
            1 => Some(Self::One),
            5 => Some(Self::Five),
            9 => Some(Self::Nine),
            16 => Some(Self::Sixteen),
            _ => None,
        }
    }

    /// Returns the strike count.
    pub const fn strikes(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Five => 5,
            Self::Nine => 9,
            Self::Sixteen => 16,
        }
    }

    /// Returns the two-bit field code.
    pub const fn code(self) -> u8 {
        match self {
            Self::One => 0b00,
            Self::Five => 0b01,
            Self::Nine => 0b10,
            Self::Sixteen => 0b11,
        }
    }

    /// Decodes the two-bit field code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b00 => Some(Self::One),
            0b01 => Some(Self::Five),
            0b10 => Some(Self::Nine),
            0b11 => Some(Self::Sixteen),
            _ => None,
        }
    }
}

/// Antenna resonance frequency division ratio shown on IRQ (`INT_MASK_ANT[7:6]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum DivisionRatio {
    /// Divide by 16.
    Div16 = 0b00,
    /// Divide by 32.
    Div32 = 0b01,
    /// Divide by 64.
    Div64 = 0b10,
    /// Divide by 128.
    Div128 = 0b11,
}

impl DivisionRatio {
    /// Maps a numeric ratio onto its setting.
    pub const fn from_ratio(ratio: u8) -> Option<Self> {
        match ratio {
            16 => Some(Self::Div16),
            32 => Some(Self::Div32),
            64 => Some(Self::Div64),
            128 => Some(Self::Div128),
            _ => None,
        }
    }

    /// Returns the numeric division ratio.
    pub const fn ratio(self) -> u8 {
        match self {
            Self::Div16 => 16,
            Self::Div32 => 32,
            Self::Div64 => 64,
            Self::Div128 => 128,
        }
    }

    /// Returns the two-bit field code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes the two-bit field code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b00 => Some(Self::Div16),
            0b01 => Some(Self::Div32),
            0b10 => Some(Self::Div64),
            0b11 => Some(Self::Div128),
            _ => None,
        }
    }
}

/// Internal oscillators that can be routed to the IRQ pin (`FREQ_DISP_IRQ[7:5]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Timer RC oscillator, 1.1 MHz.
    Trco,
    /// System RC oscillator, 32.768 kHz.
    Srco,
    /// Antenna LC oscillator.
    Lco,
}

/// Event reported by the interrupt register (`INT_MASK_ANT[3:0]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptEvent {
    /// `INT_NH`: noise level too high, persists while the noise lasts.
    NoiseLevelTooHigh,
    /// `INT_D`: disturber detected.
    Disturber,
    /// `INT_L`: lightning detected.
    Lightning,
}

impl InterruptEvent {
    /// Decodes the four-bit interrupt code; `0` and undocumented codes yield `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::NoiseLevelTooHigh),
            0x04 => Some(Self::Disturber),
            0x08 => Some(Self::Lightning),
            _ => None,
        }
    }
}

/// Tuning capacitance step added per code, in picofarads.
pub const TUNING_CAP_STEP_PF: u8 = 8;
/// Largest tuning capacitance the antenna accepts, in picofarads.
pub const TUNING_CAP_MAX_PF: u8 = 120;

/// Converts a capacitance in picofarads to the `TUN_CAP` code.
///
/// Only multiples of [`TUNING_CAP_STEP_PF`] up to [`TUNING_CAP_MAX_PF`] are accepted.
pub const fn tuning_cap_code(pf: u8) -> Option<u8> {
    if pf > TUNING_CAP_MAX_PF || pf % TUNING_CAP_STEP_PF != 0 {
        return None;
    }
    Some(pf / TUNING_CAP_STEP_PF)
}

/// Watchdog threshold domain accepted by the driver.
pub const WATCHDOG_THRESHOLD_RANGE: core::ops::RangeInclusive<u8> = 1..=10;
/// Noise floor level domain accepted by the driver.
pub const NOISE_FLOOR_RANGE: core::ops::RangeInclusive<u8> = 1..=7;
/// Spike rejection domain accepted by the driver.
pub const SPIKE_REJECTION_RANGE: core::ops::RangeInclusive<u8> = 1..=11;

/// Distance code reported when the storm is out of range.
pub const DISTANCE_OUT_OF_RANGE: u8 = 0x3F;
/// Distance code reported when the storm is overhead.
pub const DISTANCE_OVERHEAD: u8 = 0x01;
