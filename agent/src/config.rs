use crate::error::AgentError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use telemetry::units::TemperatureUnit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub device: DeviceConfig,
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub peripherals: PeripheralsConfig,
    /// Local observer API. Disabled when absent.
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    /// Frequency, in seconds, of configuration `"0"`.
    #[serde(default = "default_send_frequency")]
    pub default_send_frequency: u32,
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u64,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    #[default]
    Console,
    Serial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeripheralsConfig {
    #[serde(default)]
    pub display: DisplayKind,
    pub serial_port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

impl Default for PeripheralsConfig {
    fn default() -> Self {
        Self {
            display: DisplayKind::default(),
            serial_port: None,
            baud_rate: default_baud_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

fn default_send_frequency() -> u32 {
    5
}

fn default_keep_alive() -> u64 {
    30
}

fn default_reconnect_delay() -> u64 {
    1000
}

fn default_baud_rate() -> u32 {
    9600
}

impl Config {
    /// Load configuration from a TOML file, overridden by `AGENT__*` variables.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    pub fn load(path: &str) -> Result<Self, AgentError> {
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("AGENT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a TOML string, without environment overrides.
    pub fn from_toml(contents: &str) -> Result<Self, AgentError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), AgentError> {
        if self.device.id.trim().is_empty() {
            return Err(AgentError::InvalidConfig(
                "device.id must not be empty".to_string(),
            ));
        }

        if self.device.default_send_frequency == 0 {
            return Err(AgentError::InvalidConfig(
                "device.default_send_frequency must be positive".to_string(),
            ));
        }

        if self.peripherals.display == DisplayKind::Serial && self.peripherals.serial_port.is_none()
        {
            return Err(AgentError::InvalidConfig(
                "peripherals.serial_port is required for a serial display".to_string(),
            ));
        }

        Ok(())
    }
}

impl MqttConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_seconds)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl ApiConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
