use super::{DesiredPush, TelemetryChannel};
use crate::{config::MqttConfig, error::TransportError};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use mqtt_client::{DeviceTopics, MqttReceiver, MqttSender};
use rumqttc::Publish;
use telemetry::{DesiredDocument, ReportedDocument, TelemetryMessage};
use tokio::{
    sync::mpsc::{
        self, Receiver, Sender, UnboundedSender,
        error::{TryRecvError, TrySendError},
    },
    task::JoinHandle,
};

/// Commands waiting for a tick. Each tick takes one; further commands are
/// acknowledged and dropped.
pub const COMMAND_QUEUE_CAPACITY: usize = 16;

/// A cloud-to-device message waiting to be acknowledged.
#[derive(Debug)]
pub struct CloudMessage(Publish);

impl AsRef<[u8]> for CloudMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0.payload
    }
}

/// [`TelemetryChannel`] over MQTT.
///
/// A background task polls the connection: desired documents are parsed and
/// queued on the push queue, commands are kept until
/// [`try_receive`](TelemetryChannel::try_receive) picks them up.
///
/// Nothing here waits on the broker: outgoing messages go through the
/// client's bounded request queue and fail with [`TransportError::Publish`]
/// when it's full, so an unreachable broker never stalls the agent.
pub struct MqttChannel {
    sender: MqttSender,
    topics: DeviceTopics,
    inbound: Receiver<Publish>,
    router: JoinHandle<()>,
}

impl MqttChannel {
    /// Connects as `device_id`, queuing desired configuration pushes on `desired`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(
        device_id: &str,
        config: &MqttConfig,
        desired: UnboundedSender<DesiredPush>,
    ) -> Self {
        let mut options = mqtt_client::options(
            "telemetry-agent",
            &config.host,
            config.port,
            config.keep_alive(),
        );
        options.set_manual_acks(true);

        let (sender, eventloop) = MqttSender::new(options);
        let topics = DeviceTopics::new(device_id);

        let mut receiver = MqttReceiver::from_client(sender.client(), eventloop)
            .with_reconnect_delay(config.reconnect_delay());
        receiver.subscribe(&topics.desired);
        receiver.subscribe(&topics.commands);

        let (inbound_tx, inbound) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let router = tokio::spawn(route(receiver, topics.clone(), desired, inbound_tx));

        Self {
            sender,
            topics,
            inbound,
            router,
        }
    }

    pub fn topics(&self) -> &DeviceTopics {
        &self.topics
    }

    /// Disconnects from the broker and stops the background task.
    pub async fn shutdown(self) {
        if let Err(e) = self.sender.try_disconnect() {
            error!("Error disconnecting MQTT client: {}", e);
        }

        self.router.abort();
        match self.router.await {
            Err(e) if !e.is_cancelled() => error!("MQTT router failed: {}", e),
            _ => info!("MQTT router stopped"),
        }
    }
}

#[async_trait]
impl TelemetryChannel for MqttChannel {
    type Message = CloudMessage;

    async fn publish(&self, message: &TelemetryMessage) -> Result<(), TransportError> {
        let payload = message.to_json()?;

        self.sender
            .try_publish(&self.topics.events, &payload)
            .map_err(|source| TransportError::Publish {
                topic: self.topics.events.clone(),
                source,
            })
    }

    async fn try_receive(&mut self) -> Result<Option<Self::Message>, TransportError> {
        match self.inbound.try_recv() {
            Ok(msg) => Ok(Some(CloudMessage(msg))),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Closed),
        }
    }

    async fn acknowledge(&mut self, message: Self::Message) -> Result<(), TransportError> {
        self.sender
            .try_ack(&message.0)
            .map_err(TransportError::Ack)
    }

    async fn publish_reported_state(
        &self,
        document: &ReportedDocument,
    ) -> Result<(), TransportError> {
        let payload = document.to_json()?;

        self.sender
            .try_publish_retained(&self.topics.reported, &payload)
            .map_err(|source| TransportError::Publish {
                topic: self.topics.reported.clone(),
                source,
            })
    }
}

#[derive(Debug, PartialEq)]
enum Route {
    Desired(DesiredPush),
    Command,
    Other,
}

fn classify(topics: &DeviceTopics, msg: &Publish) -> Route {
    if msg.topic == topics.desired {
        Route::Desired(DesiredDocument::parse(&msg.payload))
    } else if msg.topic == topics.commands {
        Route::Command
    } else {
        Route::Other
    }
}

/// Hands a command to the tick. A full queue gives the message back.
fn queue_command(inbound: &Sender<Publish>, msg: Publish) -> Result<(), TrySendError<Publish>> {
    inbound.try_send(msg)
}

async fn route(
    mut receiver: MqttReceiver,
    topics: DeviceTopics,
    desired: UnboundedSender<DesiredPush>,
    inbound: Sender<Publish>,
) {
    loop {
        let msg = receiver.next_message().await;

        match classify(&topics, &msg) {
            Route::Desired(push) => {
                info!("Desired config received: {:?}", push);
                if let Err(e) = receiver.ack_now(&msg) {
                    error!("Error acknowledging desired document: {}", e);
                }
                if desired.send(push).is_err() {
                    info!("Desired config queue closed, stopping MQTT router");
                    break;
                }
            }
            Route::Command => match queue_command(&inbound, msg) {
                Ok(()) => {}
                Err(TrySendError::Full(msg)) => {
                    warn!("Command queue full, dropping message on {}", msg.topic);
                    if let Err(e) = receiver.ack_now(&msg) {
                        error!("Error acknowledging dropped command: {}", e);
                    }
                }
                Err(TrySendError::Closed(_)) => {
                    info!("Inbound queue closed, stopping MQTT router");
                    break;
                }
            },
            Route::Other => {
                debug!("Ignoring message on {}", msg.topic);
                if let Err(e) = receiver.ack_now(&msg) {
                    error!("Error acknowledging message: {}", e);
                }
            }
        }
    }
}
