pub mod mock;
pub mod mqtt;

use crate::error::TransportError;
use async_trait::async_trait;
use telemetry::{Configuration, ReportedDocument, TelemetryMessage};

/// A desired configuration delivered by the remote side.
///
/// `None` means the push carried no usable configuration.
pub type DesiredPush = Option<Configuration>;

/// Duplex link to the remote service.
///
/// Desired configuration pushes don't go through this trait: the channel is
/// built with the sending half of a queue the agent's event loop drains, so
/// pushes are handled one at a time, in between ticks.
#[async_trait]
pub trait TelemetryChannel: Send + Sync {
    /// An inbound message, kept until it is acknowledged.
    type Message: AsRef<[u8]> + Send;

    async fn publish(&self, message: &TelemetryMessage) -> Result<(), TransportError>;

    /// Takes the next inbound message, if one is waiting. Doesn't block.
    async fn try_receive(&mut self) -> Result<Option<Self::Message>, TransportError>;

    async fn acknowledge(&mut self, message: Self::Message) -> Result<(), TransportError>;

    /// Pushes the full reported document.
    async fn publish_reported_state(&self, document: &ReportedDocument)
    -> Result<(), TransportError>;
}
