use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::state::{Configuration, ReportedState, StatusKind};

/// Reported document as published to the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedDocument {
    pub telemetry_config: ReportedTelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedTelemetryConfig {
    pub config_id: String,
    pub send_frequency: u32,
    pub status: StatusKind,
    pub pending_config: Option<Configuration>,
}

impl From<&ReportedState> for ReportedDocument {
    fn from(state: &ReportedState) -> Self {
        ReportedDocument {
            telemetry_config: ReportedTelemetryConfig {
                config_id: state.telemetry_config.config_id.clone(),
                send_frequency: state.telemetry_config.send_frequency,
                status: state.status.kind(),
                pending_config: state.pending_config().cloned(),
            },
        }
    }
}

impl ReportedDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Desired document pushed by the remote side.
///
/// Every key other than `telemetryConfig` is ignored, so versioning metadata
/// added by the remote service doesn't get in the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry_config: Option<Configuration>,
}

impl DesiredDocument {
    pub fn new(config: Configuration) -> Self {
        Self {
            telemetry_config: Some(config),
        }
    }

    /// Extract the desired configuration from a raw payload.
    ///
    /// Anything that isn't a complete, usable configuration means "no change
    /// requested" and yields `None`.
    pub fn parse(payload: &[u8]) -> Option<Configuration> {
        let document = match serde_json::from_slice::<DesiredDocument>(payload) {
            Ok(document) => document,
            Err(e) => {
                debug!("ignoring malformed desired document: {}", e);
                return None;
            }
        };

        match document.telemetry_config {
            Some(config) if config.is_valid() => Some(config),
            Some(config) => {
                warn!(
                    "ignoring desired config {} with non-positive frequency",
                    config.config_id
                );
                None
            }
            None => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ConfigStatus;
    use serde_json::{Value, json};

    #[test]
    fn idle_state_reports_null_pending_config() {
        let state = ReportedState::new(5);

        let value = serde_json::to_value(ReportedDocument::from(&state)).unwrap();
        assert_eq!(
            value,
            json!({"telemetryConfig": {
                "configId": "0",
                "sendFrequency": 5,
                "status": "Idle",
                "pendingConfig": null
            }})
        );
    }

    #[test]
    fn pending_state_reports_pending_config() {
        let mut state = ReportedState::new(5);
        state.status = ConfigStatus::Pending(Configuration::new("1", 10));

        let value: Value = serde_json::to_value(ReportedDocument::from(&state)).unwrap();
        assert_eq!(value["telemetryConfig"]["status"], "Pending");
        assert_eq!(value["telemetryConfig"]["configId"], "0");
        assert_eq!(
            value["telemetryConfig"]["pendingConfig"],
            json!({"configId": "1", "sendFrequency": 10})
        );
    }

    #[test]
    fn parses_desired_config_and_ignores_extra_keys() {
        let payload = br#"{"telemetryConfig": {"configId": "7", "sendFrequency": 30}, "$version": 4}"#;

        assert_eq!(
            DesiredDocument::parse(payload),
            Some(Configuration::new("7", 30))
        );
    }

    #[test]
    fn missing_telemetry_config_is_no_change() {
        assert_eq!(DesiredDocument::parse(br#"{"$version": 2}"#), None);
    }

    #[test]
    fn partial_or_invalid_payloads_are_no_change() {
        assert_eq!(
            DesiredDocument::parse(br#"{"telemetryConfig": {"configId": "1"}}"#),
            None
        );
        assert_eq!(
            DesiredDocument::parse(br#"{"telemetryConfig": {"configId": "1", "sendFrequency": 0}}"#),
            None
        );
        assert_eq!(
            DesiredDocument::parse(br#"{"telemetryConfig": {"configId": "1", "sendFrequency": -3}}"#),
            None
        );
        assert_eq!(DesiredDocument::parse(b"not json"), None);
    }

    #[test]
    fn desired_document_serializes_for_the_remote_side() {
        let json = DesiredDocument::new(Configuration::new("2", 15))
            .to_json()
            .unwrap();

        assert_eq!(
            json,
            r#"{"telemetryConfig":{"configId":"2","sendFrequency":15}}"#
        );
    }
}
