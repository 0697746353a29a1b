use crate::{Display, Reading, SensorSource};
use std::sync::{Arc, Mutex};

/// Always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct MockSensor(pub Reading);

impl SensorSource for MockSensor {
    fn read(&mut self) -> Reading {
        self.0
    }
}

/// Keeps everything written to it so tests can inspect it.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    lines: Arc<Mutex<Vec<String>>>,
    backlight: Arc<Mutex<Option<(u8, u8, u8)>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn backlight(&self) -> Option<(u8, u8, u8)> {
        *self.backlight.lock().unwrap()
    }
}

impl Display for RecordingDisplay {
    fn write(&mut self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }

    fn set_backlight(&mut self, red: u8, green: u8, blue: u8) {
        *self.backlight.lock().unwrap() = Some((red, green, blue));
    }
}
