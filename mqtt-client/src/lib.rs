pub mod receiver;
pub mod sender;
pub mod topics;

use rumqttc::MqttOptions;
use std::time::Duration;
use uuid::Uuid;

pub use receiver::MqttReceiver;
pub use sender::MqttSender;
pub use topics::DeviceTopics;

/// Builds connection options with a unique client id of the form `<prefix>-<uuid>`.
pub fn options(prefix: &str, host: &str, port: u16, keep_alive: Duration) -> MqttOptions {
    let client_id = format!("{}-{}", prefix, Uuid::new_v4());
    let mut options = MqttOptions::new(client_id, host, port);
    options.set_keep_alive(keep_alive);

    options
}
