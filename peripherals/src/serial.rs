use crate::{Display, PeripheralError};
use log::error;
use serialport::SerialPort;
use std::time::Duration;

/// Upper bound on how long a single write may block the caller.
///
/// A status line is under 64 bytes, about 70 ms at 9600 baud.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(250);

/// A character display driven over a serial line.
///
/// Text is sent as `TXT=<line>\n`, backlight changes as `RGB=<r>,<g>,<b>\n`.
///
/// Writes are blocking and run on the caller's thread. They're short and
/// capped by [`WRITE_TIMEOUT`]; a stalled display drops the line and logs
/// the timeout instead of holding up the tick.
pub struct SerialDisplay {
    pub port: Box<dyn SerialPort>,
}

impl SerialDisplay {
    /// Opens the display on the given port name and baud rate.
    pub fn new(port_name: &str, baud_rate: u32) -> Result<Self, PeripheralError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|source| PeripheralError::Open {
                port: port_name.to_string(),
                source,
            })?;

        Ok(Self { port })
    }

    fn send(&mut self, line: &str) -> Result<(), PeripheralError> {
        self.port.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl Display for SerialDisplay {
    fn write(&mut self, text: &str) {
        if let Err(e) = self.send(&text_frame(text)) {
            error!("{}", e);
        }
    }

    fn set_backlight(&mut self, red: u8, green: u8, blue: u8) {
        if let Err(e) = self.send(&backlight_frame(red, green, blue)) {
            error!("{}", e);
        }
    }
}

fn text_frame(text: &str) -> String {
    format!("TXT={}\n", text)
}

fn backlight_frame(red: u8, green: u8, blue: u8) -> String {
    format!("RGB={},{},{}\n", red, green, blue)
}
