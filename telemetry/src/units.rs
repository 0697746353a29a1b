use serde::{Deserialize, Serialize};

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    (9.0 / 5.0) * celsius + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (5.0 / 9.0) * (fahrenheit - 32.0)
}

/// Unit temperatures are displayed and reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a sensor value, always measured in Celsius, to this unit.
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_points() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
        assert!((fahrenheit_to_celsius(98.6) - 37.0).abs() < 1e-9);
    }

    #[test]
    fn fahrenheit_is_the_default_unit() {
        assert_eq!(TemperatureUnit::default(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::default().from_celsius(-40.0), -40.0);
        assert_eq!(TemperatureUnit::Celsius.from_celsius(21.5), 21.5);
    }
}
