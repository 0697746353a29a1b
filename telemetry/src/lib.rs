pub mod document;
pub mod state;
pub mod units;

use serde::{Deserialize, Serialize};

pub use document::{DesiredDocument, ReportedDocument};
pub use state::{ConfigStatus, Configuration, ReportedState};

/// A single reading as it is sent to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryMessage {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
}

impl TelemetryMessage {
    pub fn new(device_id: impl Into<String>, temperature: f64, humidity: f64) -> Self {
        Self {
            device_id: device_id.into(),
            temperature,
            humidity,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn telemetry_message_uses_camel_case_keys() {
        let msg = TelemetryMessage::new("pi-01", 71.6, 32.0);

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"deviceId": "pi-01", "temperature": 71.6, "humidity": 32.0})
        );
    }
}
