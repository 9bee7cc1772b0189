//! Driver configuration: measurement mode and self-test limits.

use crate::Command;

/// Represents the measurement mode of the SCL3300 sensor.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MeasurementMode {
    /// 40 Hz low pass filter, the power-on default.
    Mode1,
    /// Wider range, 70 Hz low pass filter.
    Mode2,
    /// Inclination mode, 10 Hz low pass filter.
    Mode3,
    /// Inclination mode, 10 Hz low pass filter, low noise.
    Mode4,
}

impl MeasurementMode {
    /// The catalogue frame that selects this mode.
    pub const fn command(self) -> Command {
        match self {
            MeasurementMode::Mode1 => Command::ChangeToMode1,
            MeasurementMode::Mode2 => Command::ChangeToMode2,
            MeasurementMode::Mode3 => Command::ChangeToMode3,
            MeasurementMode::Mode4 => Command::ChangeToMode4,
        }
    }

    /// Acceleration sensitivity in LSB per g.
    pub const fn sensitivity(self) -> f32 {
        match self {
            MeasurementMode::Mode1 => 6000.0,
            MeasurementMode::Mode2 => 3000.0,
            MeasurementMode::Mode3 | MeasurementMode::Mode4 => 12000.0,
        }
    }

    /// Time for the signal path to settle after the mode is set, in milliseconds.
    pub const fn settling_time_ms(self) -> u32 {
        match self {
            MeasurementMode::Mode1 | MeasurementMode::Mode2 => 25,
            MeasurementMode::Mode3 | MeasurementMode::Mode4 => 100,
        }
    }
}

/// Configuration settings for the SCL3300 sensor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// The measurement mode selected by the start-up sequence.
    pub mode: MeasurementMode,
    /// Largest self-test output magnitude, in LSB, considered healthy.
    pub sto_threshold: u16,
    /// Consecutive out-of-threshold self-test readings reported as a component failure.
    pub sto_failure_limit: u8,
    /// Whether the start-up sequence enables the angle outputs.
    pub angle_outputs: bool,
}

impl Config {
    /// Creates a new `Config` instance.
    ///
    /// # Arguments
    ///
    /// * `mode` - The `MeasurementMode` for the sensor.
    ///
    /// # Returns
    ///
    /// A new `Config` with the given mode and default self-test limits.
    pub fn new(mode: MeasurementMode) -> Config {
        Config {
            mode,
            ..Config::default()
        }
    }
    /// Sets the measurement mode for the configuration.
    pub fn mode(mut self, mode: MeasurementMode) -> Self {
        self.mode = mode;
        self
    }
    /// Sets the self-test output threshold, in LSB.
    pub fn sto_threshold(mut self, threshold: u16) -> Self {
        self.sto_threshold = threshold;
        self
    }
    /// Sets how many consecutive exceedances make a component failure.
    ///
    /// A limit of zero is treated as one.
    pub fn sto_failure_limit(mut self, limit: u8) -> Self {
        self.sto_failure_limit = limit.max(1);
        self
    }
    /// Enables or disables the angle outputs during start-up.
    pub fn angle_outputs(mut self, enabled: bool) -> Self {
        self.angle_outputs = enabled;
        self
    }
}

/// Provides default configuration values for the SCL3300 sensor.
impl Default for Config {
    /// Returns the default configuration.
    ///
    /// Mode 1, a self-test threshold of 1800 LSB, component failure after
    /// three consecutive exceedances, angle outputs enabled.
    fn default() -> Config {
        Config {
            mode: MeasurementMode::Mode1,
            sto_threshold: 1800,
            sto_failure_limit: 3,
            angle_outputs: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = Config::new(MeasurementMode::Mode3)
            .sto_threshold(1500)
            .sto_failure_limit(0)
            .angle_outputs(false);
        assert_eq!(config.mode, MeasurementMode::Mode3);
        assert_eq!(config.sto_threshold, 1500);
        assert_eq!(config.sto_failure_limit, 1);
        assert!(!config.angle_outputs);
    }

    #[test]
    fn mode_commands_target_command_register() {
        assert_eq!(MeasurementMode::Mode4.command(), Command::ChangeToMode4);
        assert_eq!(MeasurementMode::Mode1.command().frame().decode().data, 0);
        assert_eq!(MeasurementMode::Mode3.command().frame().decode().data, 2);
    }
}
