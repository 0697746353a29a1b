use std::time::Duration;

use mqtt_client::{DeviceTopics, MqttReceiver, MqttSender};
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() {
    let topics = DeviceTopics::new("demo-01");
    println!("Listening on broker localhost:1883, topic {}", topics.events);

    let options = mqtt_client::options("demo-receiver", "127.0.0.1", 1883, Duration::from_secs(30));
    let (sender, eventloop) = MqttSender::new(options);
    let mut receiver = MqttReceiver::from_client(sender.client(), eventloop);
    receiver.subscribe(&topics.events);

    let mut messages = Box::pin(receiver.into_stream().take(7));
    while let Some(msg) = messages.next().await {
        println!("Received message: {}", String::from_utf8_lossy(&msg.payload));
    }
}
