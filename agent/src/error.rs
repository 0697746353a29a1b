use peripherals::PeripheralError;
use rumqttc::ClientError;
use thiserror::Error;

/// A failure talking to the remote service.
///
/// Never fatal: the caller logs it and carries on with the next tick or push.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("publish to {topic} failed: {source}")]
    Publish {
        topic: String,
        #[source]
        source: ClientError,
    },

    #[error("acknowledge failed: {0}")]
    Ack(#[source] ClientError),

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("channel closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Peripheral(#[from] PeripheralError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
