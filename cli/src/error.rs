use thiserror::Error;

/// Custom error type for CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("send frequency must be a positive number of seconds")]
    InvalidFrequency,

    #[error("config id must not be empty")]
    EmptyConfigId,

    #[error("error serializing data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("error talking to the broker: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error("connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    #[error("timed out waiting for the broker")]
    Timeout,
}
