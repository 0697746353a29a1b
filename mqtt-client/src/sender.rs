use log::debug;
use rumqttc::{AsyncClient, ClientError, EventLoop, MqttOptions, Publish, QoS};

#[derive(Clone)]
pub struct MqttSender {
    client: AsyncClient,
}

impl MqttSender {
    /// Creates a client. The returned event loop must be polled, usually by
    /// handing it to an [`MqttReceiver`](crate::MqttReceiver).
    pub fn new(options: MqttOptions) -> (Self, EventLoop) {
        let (client, eventloop) = AsyncClient::new(options, 10);

        (Self { client }, eventloop)
    }

    pub fn from_client(client: AsyncClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    pub async fn publish(&self, topic: &str, payload: &str) -> Result<(), ClientError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload.as_bytes())
            .await?;

        debug!("Published message {} to topic: {}", payload, topic);
        Ok(())
    }

    /// Publishes a message the broker keeps for late subscribers.
    pub async fn publish_retained(&self, topic: &str, payload: &str) -> Result<(), ClientError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, true, payload.as_bytes())
            .await?;

        debug!("Published retained message {} to topic: {}", payload, topic);
        Ok(())
    }

    /// Queues a message without waiting for room in the request queue.
    ///
    /// Fails right away when the queue is full, e.g. while the broker is
    /// unreachable and the event loop can't send anything.
    pub fn try_publish(&self, topic: &str, payload: &str) -> Result<(), ClientError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.as_bytes())?;

        debug!("Queued message {} to topic: {}", payload, topic);
        Ok(())
    }

    /// Retained variant of [`try_publish`](Self::try_publish).
    pub fn try_publish_retained(&self, topic: &str, payload: &str) -> Result<(), ClientError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, true, payload.as_bytes())?;

        debug!("Queued retained message {} to topic: {}", payload, topic);
        Ok(())
    }

    /// Acknowledges an incoming message. Only needed with manual acks enabled.
    pub fn try_ack(&self, publish: &Publish) -> Result<(), ClientError> {
        self.client.try_ack(publish)
    }

    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.client.disconnect().await
    }

    pub fn try_disconnect(&self) -> Result<(), ClientError> {
        self.client.try_disconnect()
    }
}
