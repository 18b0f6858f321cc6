//! High-level AS3935 device driver implementation.

use crate::calibration::{run_calibration, CalibrationReport};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::field::{
    self, Field, AFE_GAIN, CLEAR_STATISTICS, DISPLAY_LCO, DISPLAY_SRCO, DISPLAY_TRCO, DISTANCE,
    DIVISION_RATIO, INTERRUPT, MASK_DISTURBER, MIN_NUM_LIGHTNING, NOISE_FLOOR, POWER_DOWN,
    SPIKE_REJECTION, TUNING_CAP, WATCHDOG_THRESHOLD,
};
use crate::interface::i2c::I2cInterface;
use crate::interface::spi::SpiInterface;
use crate::interface::As3935Interface;
use crate::params::{
    tuning_cap_code, DivisionRatio, Environment, InterruptEvent, Oscillator, StrikeThreshold,
    NOISE_FLOOR_RANGE, SPIKE_REJECTION_RANGE, TUNING_CAP_STEP_PF, WATCHDOG_THRESHOLD_RANGE,
};
use crate::registers::{InterruptStatus, DIRECT_COMMAND, REG_INT_MASK_ANT, REG_PRESET_DEFAULT};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiBus;

// LCO settles in 2 ms, the RC oscillators need another 2 ms after that.
const STARTUP_DELAY_MS: u32 = 4;
// The interrupt register is populated 2 ms after IRQ goes high.
const INTERRUPT_SETTLE_MS: u32 = 2;

/// High-level synchronous driver for the AS3935 lightning sensor.
///
/// The handle owns its bus interface. Field updates are non-atomic
/// read-modify-write cycles, so sharing a handle between execution contexts
/// requires external locking around the whole handle.
pub struct As3935<IFACE> {
    interface: IFACE,
    config: Config,
}

impl<IFACE> As3935<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE, config: Config) -> Self {
        Self { interface, config }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<I2C> As3935<I2cInterface<I2C>>
where
    I2C: I2c,
{
    // ==================================================================
    // == Transport Convenience Constructors ============================
    // ==================================================================
    /// Convenience constructor for I2C transports.
    pub fn new_i2c(i2c: I2C, address: u8, config: Config) -> Self {
        Self::new(I2cInterface::new(i2c, address), config)
    }

    /// Releases the driver, returning the I2C bus and configuration.
    pub fn release_i2c(self) -> (I2C, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<SPI, CS> As3935<SpiInterface<SPI, CS>>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Convenience constructor for SPI transports.
    ///
    /// `spi` must already run in [`SPI_MODE`](crate::interface::spi::SPI_MODE) at `clock_hz`.
    pub fn new_spi(spi: SPI, cs: CS, clock_hz: u32, config: Config) -> Self {
        Self::new(SpiInterface::new(spi, cs, clock_hz), config)
    }

    /// Releases the driver, returning the SPI bus, chip-select pin and configuration.
    pub fn release_spi(self) -> (SPI, CS, Config) {
        let (iface, config) = self.release();
        let (spi, cs) = iface.release();
        (spi, cs, config)
    }
}

impl<IFACE, CommE> As3935<IFACE>
where
    IFACE: As3935Interface<Error = CommE>,
{
    // ==================================================================
    // == Initialization & Global Configuration ==========================
    // ==================================================================
    /// Initializes the sensor using the current configuration.
    ///
    /// Waits for the oscillators to start, probes the bus and then applies
    /// the configuration. Nothing is written when the binding or the
    /// configuration is invalid, or when the probe is not acknowledged.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.interface
            .binding()
            .validate()
            .map_err(|_| Error::InvalidConfig)?;
        self.config.validate().map_err(|_| Error::InvalidConfig)?;

        delay.delay_ms(STARTUP_DELAY_MS);
        if !self.interface.probe()? {
            debug!("probe not acknowledged");
            return Err(Error::NotConnected);
        }

        self.configure(self.config)
    }

    /// Applies a new configuration to the device.
    pub fn configure(&mut self, config: Config) -> Result<(), CommE> {
        config.validate().map_err(|_| Error::InvalidConfig)?;

        self.set_environment(config.environment)?;
        self.set_watchdog_threshold(config.watchdog_threshold)?;
        self.set_noise_floor(config.noise_floor)?;
        self.set_spike_rejection(config.spike_rejection)?;
        self.set_strike_threshold(config.strike_threshold.strikes())?;
        self.set_disturber_mask(config.disturber_masked)?;
        self.set_division_ratio(config.division_ratio.ratio())?;
        self.set_tuning_capacitance(config.tuning_capacitance_pf)?;

        self.config = config;
        Ok(())
    }

    /// Restores every register to its power-on default.
    pub fn reset_settings(&mut self) -> Result<(), CommE> {
        self.interface
            .write_register(REG_PRESET_DEFAULT, DIRECT_COMMAND)?;
        self.config = Config::default();
        Ok(())
    }

    // ==================================================================
    // == Register Field Engine =========================================
    // ==================================================================
    /// Writes a raw value into any catalog field.
    pub fn set_field(&mut self, field: Field, value: u8) -> Result<(), CommE> {
        field::write_field(&mut self.interface, field, value)
    }

    /// Reads the raw value of any catalog field.
    pub fn get_field(&mut self, field: Field) -> Result<u8, CommE> {
        field::read_field(&mut self.interface, field)
    }

    // ==================================================================
    // == Power & Calibration ===========================================
    // ==================================================================
    /// Puts the sensor into its low-power state.
    ///
    /// The TRCO loses its trim while powered down, use [`Self::wake_up`] to resume.
    pub fn power_down(&mut self) -> Result<(), CommE> {
        self.set_field(POWER_DOWN, 1)
    }

    /// Leaves power-down and recalibrates the RC oscillators.
    pub fn wake_up(&mut self, delay: &mut impl DelayNs) -> Result<CalibrationReport, CommE> {
        self.set_field(POWER_DOWN, 0)?;
        self.calibrate_oscillators(delay)
    }

    /// Runs the RC oscillator calibration sequence.
    pub fn calibrate_oscillators(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<CalibrationReport, CommE> {
        run_calibration(&mut self.interface, delay)
    }

    /// Routes one of the internal oscillators to the IRQ pin.
    pub fn display_oscillator(&mut self, oscillator: Oscillator, enabled: bool) -> Result<(), CommE> {
        let field = match oscillator {
            Oscillator::Trco => DISPLAY_TRCO,
            Oscillator::Srco => DISPLAY_SRCO,
            Oscillator::Lco => DISPLAY_LCO,
        };
        self.set_field(field, enabled as u8)
    }

    // ==================================================================
    // == Detection Tuning ==============================================
    // ==================================================================
    /// Selects the indoor or outdoor AFE gain preset.
    pub fn set_environment(&mut self, environment: Environment) -> Result<(), CommE> {
        self.set_field(AFE_GAIN, environment.code())?;
        self.config.environment = environment;
        Ok(())
    }

    /// Reads the AFE gain preset.
    pub fn environment(&mut self) -> Result<Environment, CommE> {
        let code = self.get_field(AFE_GAIN)?;
        Environment::from_code(code).ok_or(Error::UnexpectedRegisterData {
            register: AFE_GAIN.register(),
            value: code,
        })
    }

    /// Sets the watchdog threshold, 1 to 10.
    pub fn set_watchdog_threshold(&mut self, threshold: u8) -> Result<(), CommE> {
        if !WATCHDOG_THRESHOLD_RANGE.contains(&threshold) {
            return Err(Error::InvalidValue);
        }
        self.set_field(WATCHDOG_THRESHOLD, threshold)?;
        self.config.watchdog_threshold = threshold;
        Ok(())
    }

    /// Reads the watchdog threshold.
    pub fn watchdog_threshold(&mut self) -> Result<u8, CommE> {
        self.get_field(WATCHDOG_THRESHOLD)
    }

    /// Sets the noise floor level, 1 to 7.
    pub fn set_noise_floor(&mut self, level: u8) -> Result<(), CommE> {
        if !NOISE_FLOOR_RANGE.contains(&level) {
            return Err(Error::InvalidValue);
        }
        self.set_field(NOISE_FLOOR, level)?;
        self.config.noise_floor = level;
        Ok(())
    }

    /// Reads the noise floor level.
    pub fn noise_floor(&mut self) -> Result<u8, CommE> {
        self.get_field(NOISE_FLOOR)
    }

    /// Sets the spike rejection level, 1 to 11.
    pub fn set_spike_rejection(&mut self, level: u8) -> Result<(), CommE> {
        if !SPIKE_REJECTION_RANGE.contains(&level) {
            return Err(Error::InvalidValue);
        }
        self.set_field(SPIKE_REJECTION, level)?;
        self.config.spike_rejection = level;
        Ok(())
    }

    /// Reads the spike rejection level.
    pub fn spike_rejection(&mut self) -> Result<u8, CommE> {
        self.get_field(SPIKE_REJECTION)
    }

    /// Sets how many strikes within 15 minutes raise an interrupt: 1, 5, 9 or 16.
    pub fn set_strike_threshold(&mut self, strikes: u8) -> Result<(), CommE> {
        let threshold = StrikeThreshold::from_strikes(strikes).ok_or(Error::InvalidValue)?;
        self.set_field(MIN_NUM_LIGHTNING, threshold.code())?;
        self.config.strike_threshold = threshold;
        Ok(())
    }

    /// Reads the strike count threshold.
    pub fn strike_threshold(&mut self) -> Result<u8, CommE> {
        let code = self.get_field(MIN_NUM_LIGHTNING)?;
        StrikeThreshold::from_code(code)
            .map(StrikeThreshold::strikes)
            .ok_or(Error::UnexpectedRegisterData {
                register: MIN_NUM_LIGHTNING.register(),
                value: code,
            })
    }

    /// Clears the strike statistics of the current 15 minute window.
    pub fn clear_statistics(&mut self) -> Result<(), CommE> {
        // The sensor only latches a full high-low-high sequence.
        self.set_field(CLEAR_STATISTICS, 1)?;
        self.set_field(CLEAR_STATISTICS, 0)?;
        self.set_field(CLEAR_STATISTICS, 1)
    }

    /// Keeps disturber events off the IRQ pin when `masked` is set.
    pub fn set_disturber_mask(&mut self, masked: bool) -> Result<(), CommE> {
        self.set_field(MASK_DISTURBER, masked as u8)?;
        self.config.disturber_masked = masked;
        Ok(())
    }

    /// Reads whether disturber events are masked.
    pub fn disturber_masked(&mut self) -> Result<bool, CommE> {
        Ok(self.get_field(MASK_DISTURBER)? == 1)
    }

    // ==================================================================
    // == Antenna Tuning ================================================
    // ==================================================================
    /// Sets the division ratio for the antenna frequency shown on IRQ: 16, 32, 64 or 128.
    pub fn set_division_ratio(&mut self, ratio: u8) -> Result<(), CommE> {
        let division = DivisionRatio::from_ratio(ratio).ok_or(Error::InvalidValue)?;
        self.set_field(DIVISION_RATIO, division.code())?;
        self.config.division_ratio = division;
        Ok(())
    }

    /// Reads the antenna frequency division ratio.
    pub fn division_ratio(&mut self) -> Result<u8, CommE> {
        let code = self.get_field(DIVISION_RATIO)?;
        DivisionRatio::from_code(code)
            .map(DivisionRatio::ratio)
            .ok_or(Error::UnexpectedRegisterData {
                register: DIVISION_RATIO.register(),
                value: code,
            })
    }

    /// Adds internal capacitance to the antenna, 0 to 120 pF in 8 pF steps.
    pub fn set_tuning_capacitance(&mut self, pf: u8) -> Result<(), CommE> {
        let code = tuning_cap_code(pf).ok_or(Error::InvalidValue)?;
        self.set_field(TUNING_CAP, code)?;
        self.config.tuning_capacitance_pf = pf;
        Ok(())
    }

    /// Reads the internal antenna capacitance in picofarads.
    pub fn tuning_capacitance(&mut self) -> Result<u8, CommE> {
        Ok(self.get_field(TUNING_CAP)? * TUNING_CAP_STEP_PF)
    }

    // ==================================================================
    // == Events & Measurements =========================================
    // ==================================================================
    /// Reads the event that raised the IRQ pin.
    ///
    /// Waits for the interrupt register to be populated first. Must be called
    /// within one second of a lightning interrupt.
    pub fn read_interrupt(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<Option<InterruptEvent>, CommE> {
        delay.delay_ms(INTERRUPT_SETTLE_MS);
        let code = self.get_field(INTERRUPT)?;
        let event = InterruptEvent::from_code(code);
        if event.is_none() && code != 0 {
            warn!("undocumented interrupt code {=u8:#x}", code);
        }
        Ok(event)
    }

    /// Returns a snapshot of the whole `INT_MASK_ANT` register.
    ///
    /// Unlike [`Self::read_interrupt`] this does not wait for the register to settle.
    pub fn read_interrupt_status(&mut self) -> Result<InterruptStatus, CommE> {
        let raw = self.interface.read_register(REG_INT_MASK_ANT)?;
        Ok(InterruptStatus::from(raw))
    }

    /// Reads the estimated distance to the storm front in kilometres.
    ///
    /// See [`DISTANCE_OUT_OF_RANGE`](crate::params::DISTANCE_OUT_OF_RANGE) and
    /// [`DISTANCE_OVERHEAD`](crate::params::DISTANCE_OVERHEAD) for the special codes.
    pub fn distance_to_storm(&mut self) -> Result<u8, CommE> {
        self.get_field(DISTANCE)
    }

    /// Reads the raw energy of the last strike. The value has no physical unit.
    pub fn lightning_energy(&mut self) -> Result<u32, CommE> {
        field::read_energy(&mut self.interface)
    }
}
