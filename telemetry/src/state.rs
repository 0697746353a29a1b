use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the configuration every device boots with.
pub const INITIAL_CONFIG_ID: &str = "0";

/// One revision of the telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub config_id: String,
    /// Sampling and publish period, in seconds.
    pub send_frequency: u32,
}

impl Configuration {
    pub fn new(config_id: impl Into<String>, send_frequency: u32) -> Self {
        Self {
            config_id: config_id.into(),
            send_frequency,
        }
    }

    /// The configuration a device starts with before any push was applied.
    pub fn initial(send_frequency: u32) -> Self {
        Self::new(INITIAL_CONFIG_ID, send_frequency)
    }

    /// A configuration is only usable with a positive period.
    pub fn is_valid(&self) -> bool {
        self.send_frequency > 0
    }
}

/// Where the device is in applying a configuration change.
///
/// The configuration being applied lives inside [`ConfigStatus::Pending`], so
/// a pending configuration can't exist without the pending status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigStatus {
    #[default]
    Idle,
    Pending(Configuration),
    Success,
}

/// Status names as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    Idle,
    Pending,
    Success,
}

impl ConfigStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            ConfigStatus::Idle => StatusKind::Idle,
            ConfigStatus::Pending(_) => StatusKind::Pending,
            ConfigStatus::Success => StatusKind::Success,
        }
    }

    pub fn pending(&self) -> Option<&Configuration> {
        match self {
            ConfigStatus::Pending(config) => Some(config),
            _ => None,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKind::Idle => write!(f, "Idle"),
            StatusKind::Pending => write!(f, "Pending"),
            StatusKind::Success => write!(f, "Success"),
        }
    }
}

/// The device's own view of the configuration it runs and the one it's applying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedState {
    pub telemetry_config: Configuration,
    pub status: ConfigStatus,
}

impl ReportedState {
    pub fn new(default_send_frequency: u32) -> Self {
        Self {
            telemetry_config: Configuration::initial(default_send_frequency),
            status: ConfigStatus::Idle,
        }
    }

    pub fn pending_config(&self) -> Option<&Configuration> {
        self.status.pending()
    }

    /// Period, in seconds, the scheduler should be running with.
    pub fn send_frequency(&self) -> u32 {
        self.telemetry_config.send_frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle_with_initial_config() {
        let state = ReportedState::new(5);

        assert_eq!(state.telemetry_config, Configuration::new("0", 5));
        assert_eq!(state.status, ConfigStatus::Idle);
        assert!(state.pending_config().is_none());
    }

    #[test]
    fn pending_config_only_exists_while_pending() {
        let desired = Configuration::new("1", 10);

        let mut state = ReportedState::new(5);
        state.status = ConfigStatus::Pending(desired.clone());
        assert_eq!(state.status.kind(), StatusKind::Pending);
        assert_eq!(state.pending_config(), Some(&desired));

        state.status = ConfigStatus::Success;
        assert!(state.pending_config().is_none());
    }

    #[test]
    fn zero_frequency_is_invalid() {
        assert!(!Configuration::new("1", 0).is_valid());
        assert!(Configuration::new("1", 1).is_valid());
    }
}
