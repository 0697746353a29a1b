/// Topic layout for a single device.
///
/// ```
/// use mqtt_client::DeviceTopics;
///
/// let topics = DeviceTopics::new("pi-01");
/// assert_eq!(topics.events, "devices/pi-01/messages/events");
/// assert_eq!(topics.desired, "devices/pi-01/twin/desired");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopics {
    /// Device to cloud telemetry.
    pub events: String,
    /// Cloud to device messages.
    pub commands: String,
    /// Reported document, retained.
    pub reported: String,
    /// Desired document, retained.
    pub desired: String,
}

impl DeviceTopics {
    pub fn new(device_id: &str) -> Self {
        let base = format!("devices/{}", device_id);

        Self {
            events: format!("{}/messages/events", base),
            commands: format!("{}/messages/commands", base),
            reported: format!("{}/twin/reported", base),
            desired: format!("{}/twin/desired", base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_are_scoped_to_the_device() {
        let topics = DeviceTopics::new("dev-7");

        assert_eq!(topics.events, "devices/dev-7/messages/events");
        assert_eq!(topics.commands, "devices/dev-7/messages/commands");
        assert_eq!(topics.reported, "devices/dev-7/twin/reported");
        assert_eq!(topics.desired, "devices/dev-7/twin/desired");
    }
}
