#![no_std]

#[macro_use]
mod log;

mod error;

pub mod calibration;
pub mod config;
pub mod device;
pub mod field;
pub mod interface;
pub mod params;
pub mod registers;

#[cfg(test)]
mod testing;

pub use crate::calibration::CalibrationReport;
pub use crate::device::As3935;
pub use crate::error::{Error, Result};
pub use crate::field::Field;
