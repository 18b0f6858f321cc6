//! I2C interface implementation built on top of `embedded-hal` `I2c`.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use super::{As3935Interface, Binding};

/// Default target address, ADD0 and ADD1 both pulled high.
pub const ADDRESS_DEFAULT: u8 = 0x03;
/// Target address with ADD1 high and ADD0 low.
pub const ADDRESS_ADD1_HIGH: u8 = 0x02;
/// Target address with ADD1 low and ADD0 high.
pub const ADDRESS_ADD0_HIGH: u8 = 0x01;

/// I2C-based interface implementation for the AS3935 driver.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates a new interface talking to `address` on the provided bus.
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Returns the target address this interface is bound to.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Provides mutable access to the wrapped I2C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> As3935Interface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error> {
        // Register pointer write followed by a repeated start, the bus is not released in between.
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, core::slice::from_ref(&register), &mut value)?;
        Ok(value[0])
    }

    fn probe(&mut self) -> core::result::Result<bool, Self::Error> {
        match self.i2c.write(self.address, &[]) {
            Ok(()) => Ok(true),
            Err(err) if matches!(err.kind(), ErrorKind::NoAcknowledge(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn binding(&self) -> Binding {
        Binding::I2c {
            address: self.address,
        }
    }
}
