//! SPI interface implementation built on top of `embedded-hal` `SpiBus`.
//!
//! The AS3935 needs the chip-select line toggled once more after every read,
//! which a managed `SpiDevice` cannot express, so the interface drives the
//! select pin itself.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Mode, SpiBus, MODE_1};

use super::{As3935Interface, Binding};

/// SPI mode expected by the sensor (CPOL = 0, CPHA = 1, MSB first).
pub const SPI_MODE: Mode = MODE_1;

// Mode bits 15:14 of the command word; `01` selects a read.
const READ_COMMAND: u8 = 0x40;
const ADDRESS_MASK: u8 = 0x3F;

/// Errors raised by [`SpiInterface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiInterfaceError<SpiE, PinE> {
    /// The SPI bus reported an error.
    Spi(SpiE),
    /// Driving the chip-select pin failed.
    ChipSelect(PinE),
}

/// SPI-based interface implementation for the AS3935 driver.
pub struct SpiInterface<SPI, CS> {
    spi: SPI,
    cs: CS,
    clock_hz: u32,
}

impl<SPI, CS> SpiInterface<SPI, CS> {
    /// Creates a new interface from an SPI bus already configured for
    /// [`SPI_MODE`] at `clock_hz`, and the chip-select pin of the sensor.
    pub const fn new(spi: SPI, cs: CS, clock_hz: u32) -> Self {
        Self { spi, cs, clock_hz }
    }

    /// Builds the command byte used to address registers over SPI.
    fn command_byte(register: u8, is_read: bool) -> u8 {
        let mut command = register & ADDRESS_MASK;
        if is_read {
            command |= READ_COMMAND;
        }
        command
    }

    /// Provides mutable access to the wrapped SPI bus.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI bus and chip-select pin.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> SpiInterface<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Runs `exchange` with the chip selected.
    ///
    /// The select line is driven high again on every path out of this
    /// function, including a failed exchange.
    pub fn with_chip_select<R, F>(
        &mut self,
        exchange: F,
    ) -> core::result::Result<R, SpiInterfaceError<SPI::Error, CS::Error>>
    where
        F: FnOnce(&mut SPI) -> core::result::Result<R, SPI::Error>,
    {
        self.cs.set_low().map_err(SpiInterfaceError::ChipSelect)?;

        let outcome = exchange(&mut self.spi).and_then(|value| self.spi.flush().map(|()| value));
        let released = self.cs.set_high();

        let value = outcome.map_err(SpiInterfaceError::Spi)?;
        released.map_err(SpiInterfaceError::ChipSelect)?;
        Ok(value)
    }

    /// Terminates a read with the high-low-high select pulse the sensor expects.
    fn pulse_chip_select(&mut self) -> core::result::Result<(), SpiInterfaceError<SPI::Error, CS::Error>> {
        let lowered = self.cs.set_low();
        let released = self.cs.set_high();
        lowered.map_err(SpiInterfaceError::ChipSelect)?;
        released.map_err(SpiInterfaceError::ChipSelect)
    }
}

impl<SPI, CS> As3935Interface for SpiInterface<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = SpiInterfaceError<SPI::Error, CS::Error>;

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        let frame = [Self::command_byte(register, false), value];
        self.with_chip_select(|spi| spi.write(&frame))
    }

    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error> {
        let frame = [Self::command_byte(register, true), 0x00];
        let mut response = [0u8; 2];
        self.with_chip_select(|spi| spi.transfer(&mut response, &frame))?;
        self.pulse_chip_select()?;
        Ok(response[1])
    }

    fn probe(&mut self) -> core::result::Result<bool, Self::Error> {
        // SPI has no acknowledge; deselecting the sensor is all there is to do.
        self.cs.set_high().map_err(SpiInterfaceError::ChipSelect)?;
        Ok(true)
    }

    fn binding(&self) -> Binding {
        Binding::Spi {
            clock_hz: self.clock_hz,
        }
    }
}
