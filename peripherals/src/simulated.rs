use crate::{Display, Reading, SensorSource};
use log::info;

/// A sensor that wanders slowly around a base temperature.
///
/// Used when the device runs without attached hardware.
pub struct SimulatedSensor {
    base_celsius: f64,
    humidity: f64,
    samples: u64,
}

impl SimulatedSensor {
    pub fn new(base_celsius: f64, humidity: f64) -> Self {
        Self {
            base_celsius,
            humidity,
            samples: 0,
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new(21.0, 32.0)
    }
}

impl SensorSource for SimulatedSensor {
    fn read(&mut self) -> Reading {
        // Triangle wave of +/- 0.5 degrees over 10 samples.
        let step = (self.samples % 10) as f64;
        let offset = (if step < 5.0 { step } else { 10.0 - step }) * 0.2 - 0.5;

        let reading = Reading {
            temperature_celsius: self.base_celsius + offset,
            humidity: self.humidity,
            aux_dial: ((self.samples * 64) % 1024) as u16,
        };

        self.samples += 1;
        reading
    }
}

/// Writes status lines to the log instead of a screen.
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl Display for ConsoleDisplay {
    fn write(&mut self, text: &str) {
        info!("[DISPLAY] {}", text);
    }
}
