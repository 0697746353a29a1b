use futures::{Stream, stream};
use log::{error, info, trace};
use rumqttc::{
    AsyncClient, ClientError, ConnectionError,
    Event::{Incoming, Outgoing},
    EventLoop,
    Packet::{ConnAck, PubAck, Publish as PublishPacket},
    Publish, QoS,
};
use std::time::Duration;

/// Drives the connection and yields incoming publishes.
///
/// Subscriptions are remembered and sent again every time the broker
/// acknowledges a connection, so they survive reconnects.
pub struct MqttReceiver {
    client: AsyncClient,
    eventloop: EventLoop,
    subscriptions: Vec<String>,
    reconnect_delay: Duration,
}

impl MqttReceiver {
    pub fn from_client(client: AsyncClient, eventloop: EventLoop) -> Self {
        Self {
            client,
            eventloop,
            subscriptions: Vec::new(),
            reconnect_delay: Duration::from_secs(1),
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    /// Registers a topic. The subscription is sent on the next connection ack.
    pub fn subscribe(&mut self, topic: &str) {
        self.subscriptions.push(topic.to_string());
    }

    /// Acknowledges a message without waiting on the request queue.
    ///
    /// Safe to call from the task that polls this receiver.
    pub fn ack_now(&self, publish: &Publish) -> Result<(), ClientError> {
        self.client.try_ack(publish)
    }

    /// Polls the connection until a message arrives.
    pub async fn recv(&mut self) -> Result<Publish, ConnectionError> {
        loop {
            match self.eventloop.poll().await? {
                Incoming(ConnAck(ack)) => {
                    info!("Connected to broker: {:?}", ack.code);
                    self.resubscribe();
                }
                Incoming(PublishPacket(msg)) => {
                    trace!("Message received on {}", msg.topic);
                    return Ok(msg);
                }
                Incoming(pk) => trace!("Incoming event: {:?}", pk),
                Outgoing(ev) => trace!("Outgoing event: {:?}", ev),
            }
        }
    }

    /// Like [`recv`](Self::recv), but connection errors are logged and retried
    /// after the reconnect delay.
    pub async fn next_message(&mut self) -> Publish {
        loop {
            match self.recv().await {
                Ok(msg) => return msg,
                Err(e) => {
                    error!("Connection error in recv: {}", e);
                    tokio::time::sleep(self.reconnect_delay).await;
                }
            }
        }
    }

    /// Polls the connection until the broker acknowledges a publish.
    pub async fn wait_for_puback(&mut self) -> Result<(), ConnectionError> {
        loop {
            match self.eventloop.poll().await? {
                Incoming(ConnAck(_)) => self.resubscribe(),
                Incoming(PubAck(_)) => return Ok(()),
                _ => {}
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Publish> {
        stream::unfold(self, |mut receiver| async move {
            let msg = receiver.next_message().await;
            Some((msg, receiver))
        })
    }

    fn resubscribe(&self) {
        for topic in &self.subscriptions {
            match self.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
                Ok(()) => info!("Subscribed to topic: {}", topic),
                Err(e) => error!("Error subscribing to topic {}: {}", topic, e),
            }
        }
    }
}
