//! Conversion of raw register values to physical units.

use crate::MeasurementMode;

// Angle outputs span ±90° over ±2^14 LSB.
const ANGLE_FULL_SCALE_LSB: f32 = 16384.0;
const ANGLE_FULL_SCALE_DEGREES: f32 = 90.0;

// Temperature (°C) = -273 + raw / 18.9
const TEMPERATURE_OFFSET: f32 = -273.0;
const TEMPERATURE_SENSITIVITY: f32 = 18.9;

/// Unit selector for [`temperature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureScale {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

/// Acceleration in g. Sensitivity depends on the measurement mode.
pub fn acceleration(raw: i16, mode: MeasurementMode) -> f32 {
    f32::from(raw) / mode.sensitivity()
}

/// Inclination angle in degrees.
pub fn angle(raw: i16) -> f32 {
    f32::from(raw) / ANGLE_FULL_SCALE_LSB * ANGLE_FULL_SCALE_DEGREES
}

pub fn temperature(raw: i16, scale: TemperatureScale) -> f32 {
    let celsius = TEMPERATURE_OFFSET + f32::from(raw) / TEMPERATURE_SENSITIVITY;
    match scale {
        TemperatureScale::Celsius => celsius,
        TemperatureScale::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        TemperatureScale::Kelvin => celsius + 273.15,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn acceleration_per_mode() {
        assert!(close(acceleration(6000, MeasurementMode::Mode1), 1.0));
        assert!(close(acceleration(-3000, MeasurementMode::Mode2), -1.0));
        assert!(close(acceleration(6000, MeasurementMode::Mode4), 0.5));
    }

    #[test]
    fn angle_full_scale() {
        assert!(close(angle(16384), 90.0));
        assert!(close(angle(-8192), -45.0));
        assert!(close(angle(0), 0.0));
    }

    #[test]
    fn temperature_scales() {
        // 5538 / 18.9 = 293.016
        let raw = 5538;
        let near = |a: f32, b: f32| (a - b).abs() < 0.05;
        assert!(near(temperature(raw, TemperatureScale::Celsius), 20.0));
        assert!(near(temperature(raw, TemperatureScale::Fahrenheit), 68.0));
        assert!(near(temperature(raw, TemperatureScale::Kelvin), 293.15));
    }
}
