//! Bus interface abstraction for the AS3935 driver.
//!
//! The sensor speaks the same register protocol over two wire disciplines.
//! [`I2cInterface`](i2c::I2cInterface) and [`SpiInterface`](spi::SpiInterface)
//! both implement [`As3935Interface`]; the driver is generic over it, so the
//! transport is fixed for the lifetime of an [`As3935`](crate::As3935) handle.

pub mod i2c;
pub mod spi;

/// Highest SPI clock the sensor accepts, in hertz.
pub const MAX_SPI_CLOCK_HZ: u32 = 2_000_000;
/// Resonance frequency of the antenna LC circuit, in hertz.
pub const ANTENNA_RESONANCE_HZ: u32 = 500_000;
// Clock frequencies within this many per-mille of the resonance couple into the antenna.
const ANTENNA_GUARD_PER_MILLE: u32 = 35;

/// Abstraction over the low-level bus access required by the driver.
pub trait As3935Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes a single register.
    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error>;

    /// Reads a single register.
    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error>;

    /// Checks that the sensor answers on the bus.
    ///
    /// Returns `Ok(false)` when the target did not acknowledge.
    fn probe(&mut self) -> core::result::Result<bool, Self::Error>;

    /// Describes which transport this interface is bound to.
    fn binding(&self) -> Binding;
}

/// Transport binding of a device instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Binding {
    /// Shared-bus mode addressed by a 7-bit target address.
    I2c {
        /// Target address selected by the ADD0/ADD1 straps.
        address: u8,
    },
    /// Point-to-point mode with a dedicated chip-select line.
    Spi {
        /// Clock rate the bus was configured for.
        clock_hz: u32,
    },
}

impl Binding {
    /// Checks the binding against the electrical limits of the sensor.
    pub fn validate(&self) -> core::result::Result<(), BindingError> {
        match *self {
            Self::I2c { address } => {
                if !matches!(address, 0x01..=0x03) {
                    return Err(BindingError::InvalidAddress);
                }
            }
            Self::Spi { clock_hz } => {
                if clock_hz == 0 || clock_hz > MAX_SPI_CLOCK_HZ {
                    return Err(BindingError::ClockOutOfRange);
                }

                let guard = ANTENNA_RESONANCE_HZ / 1_000 * ANTENNA_GUARD_PER_MILLE;
                if clock_hz.abs_diff(ANTENNA_RESONANCE_HZ) <= guard {
                    return Err(BindingError::ClockNearAntennaResonance);
                }
            }
        }

        Ok(())
    }
}

/// Reasons a [`Binding`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingError {
    /// The I2C address is not one the address straps can select.
    InvalidAddress,
    /// The SPI clock is zero or above [`MAX_SPI_CLOCK_HZ`].
    ClockOutOfRange,
    /// The SPI clock would interfere with the antenna.
    ClockNearAntennaResonance,
}
