pub mod mock;
pub mod serial;
pub mod simulated;

use thiserror::Error;

/// A single sample taken from the local sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_celsius: f64,
    /// Relative humidity, in percent.
    pub humidity: f64,
    /// Raw rotary dial position, `0..=1023`.
    pub aux_dial: u16,
}

pub trait SensorSource {
    /// Takes a sample. Sensors always produce a value.
    fn read(&mut self) -> Reading;
}

pub trait Display {
    /// Renders a line of status text.
    fn write(&mut self, text: &str);

    /// Sets the backlight color. Displays without a backlight ignore it.
    fn set_backlight(&mut self, _red: u8, _green: u8, _blue: u8) {}
}

impl<T: SensorSource + ?Sized> SensorSource for Box<T> {
    fn read(&mut self) -> Reading {
        (**self).read()
    }
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn write(&mut self, text: &str) {
        (**self).write(text)
    }

    fn set_backlight(&mut self, red: u8, green: u8, blue: u8) {
        (**self).set_backlight(red, green, blue)
    }
}

/// Maps the dial's `0..=1023` range onto a single color channel.
pub fn dial_to_channel(aux_dial: u16) -> u8 {
    (aux_dial.min(1023) / 4) as u8
}

#[derive(Debug, Error)]
pub enum PeripheralError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to write to display: {0}")]
    Write(#[from] std::io::Error),
}
