//! Configuration primitives for the AS3935 driver.

use crate::params::{
    tuning_cap_code, DivisionRatio, Environment, StrikeThreshold, NOISE_FLOOR_RANGE,
    SPIKE_REJECTION_RANGE, WATCHDOG_THRESHOLD_RANGE,
};

/// User-facing configuration for the AS3935 sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Indoor or outdoor AFE gain preset.
    pub environment: Environment,
    /// Watchdog threshold, 1 to 10.
    pub watchdog_threshold: u8,
    /// Noise floor level, 1 to 7.
    pub noise_floor: u8,
    /// Spike rejection level, 1 to 11.
    pub spike_rejection: u8,
    /// Strikes required within 15 minutes before an interrupt.
    pub strike_threshold: StrikeThreshold,
    /// Whether disturber events are kept off the IRQ pin.
    pub disturber_masked: bool,
    /// Division ratio applied to the antenna frequency shown on IRQ.
    pub division_ratio: DivisionRatio,
    /// Tuning capacitance added to the antenna, in picofarads.
    pub tuning_capacitance_pf: u8,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration is valid according to datasheet rules.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if !WATCHDOG_THRESHOLD_RANGE.contains(&self.watchdog_threshold) {
            return Err(ConfigError::WatchdogThreshold);
        }

        if !NOISE_FLOOR_RANGE.contains(&self.noise_floor) {
            return Err(ConfigError::NoiseFloor);
        }

        if !SPIKE_REJECTION_RANGE.contains(&self.spike_rejection) {
            return Err(ConfigError::SpikeRejection);
        }

        if tuning_cap_code(self.tuning_capacitance_pf).is_none() {
            return Err(ConfigError::TuningCapacitance);
        }

        Ok(())
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Selects the indoor or outdoor gain preset.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    /// Overrides the watchdog threshold.
    pub fn watchdog_threshold(mut self, threshold: u8) -> Self {
        self.config.watchdog_threshold = threshold;
        self
    }

    /// Overrides the noise floor level.
    pub fn noise_floor(mut self, level: u8) -> Self {
        self.config.noise_floor = level;
        self
    }

    /// Overrides the spike rejection level.
    pub fn spike_rejection(mut self, level: u8) -> Self {
        self.config.spike_rejection = level;
        self
    }

    /// Sets the number of strikes required before an interrupt.
    pub fn strike_threshold(mut self, threshold: StrikeThreshold) -> Self {
        self.config.strike_threshold = threshold;
        self
    }

    /// Masks or unmasks disturber interrupts.
    pub fn disturber_masked(mut self, masked: bool) -> Self {
        self.config.disturber_masked = masked;
        self
    }

    /// Sets the antenna frequency division ratio.
    pub fn division_ratio(mut self, ratio: DivisionRatio) -> Self {
        self.config.division_ratio = ratio;
        self
    }

    /// Sets the antenna tuning capacitance in picofarads.
    pub fn tuning_capacitance_pf(mut self, pf: u8) -> Self {
        self.config.tuning_capacitance_pf = pf;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for Config {
    /// Power-on defaults of the sensor.
    fn default() -> Self {
        Self {
            environment: Environment::Indoor,
            watchdog_threshold: 2,
            noise_floor: 2,
            spike_rejection: 2,
            strike_threshold: StrikeThreshold::One,
            disturber_masked: false,
            division_ratio: DivisionRatio::Div16,
            tuning_capacitance_pf: 0,
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Watchdog threshold outside 1 to 10.
    WatchdogThreshold,
    /// Noise floor outside 1 to 7.
    NoiseFloor,
    /// Spike rejection outside 1 to 11.
    SpikeRejection,
    /// Tuning capacitance not a multiple of 8 pF up to 120 pF.
    TuningCapacitance,
}
