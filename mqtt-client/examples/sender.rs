use std::time::Duration;

use mqtt_client::{DeviceTopics, MqttReceiver, MqttSender};

#[tokio::main]
async fn main() {
    println!("Publishing to broker localhost:1883 as device demo-01");
    let options = mqtt_client::options("demo-sender", "127.0.0.1", 1883, Duration::from_secs(30));
    let (sender, eventloop) = MqttSender::new(options);
    let mut receiver = MqttReceiver::from_client(sender.client(), eventloop);

    // The event loop has to be polled for anything to leave the client.
    tokio::spawn(async move {
        loop {
            receiver.next_message().await;
        }
    });

    let topics = DeviceTopics::new("demo-01");
    for i in 0..7 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let payload = format!(r#"{{"deviceId":"demo-01","temperature":{},"humidity":32.0}}"#, 70 + i);
        sender
            .publish(&topics.events, &payload)
            .await
            .expect("Error sending message. Is the broker on?");
    }
}
