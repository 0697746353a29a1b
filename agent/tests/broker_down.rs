use agent::{
    Agent, ConfigStore, channel::mqtt::MqttChannel, config::MqttConfig, time::MockClock,
};
use peripherals::{
    Reading,
    mock::{MockSensor, RecordingDisplay},
};
use std::time::Duration;
use telemetry::{ConfigStatus, Configuration, units::TemperatureUnit};
use tokio::{
    sync::mpsc,
    time::{sleep, timeout},
};

#[tokio::test(start_paused = true)]
async fn agent_keeps_ticking_without_a_broker() {
    let config = MqttConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        keep_alive_seconds: 30,
        reconnect_delay_ms: 1000,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let channel = MqttChannel::connect("pi-01", &config, tx.clone());
    let display = RecordingDisplay::new();
    let sensor = MockSensor(Reading {
        temperature_celsius: 25.0,
        humidity: 32.0,
        aux_dial: 0,
    });

    // One publish a second fills the client's request queue within ten ticks.
    let mut agent: Agent<_, _, _, MockClock> = Agent::new(
        "pi-01",
        TemperatureUnit::Fahrenheit,
        sensor,
        display.clone(),
        channel,
        ConfigStore::new(1),
    );
    let store = agent.store();

    tokio::spawn(async move {
        sleep(Duration::from_millis(15_500)).await;
        tx.send(Some(Configuration::new("1", 2))).unwrap();
    });

    let finished = timeout(
        Duration::from_secs(60),
        agent.run(rx, sleep(Duration::from_millis(20_500))),
    )
    .await;
    assert!(finished.is_ok(), "agent stopped responding");

    // Every second up to 15s, then every 2s from the restart at 15.5s.
    assert_eq!(display.lines().len(), 17);

    let state = store.snapshot();
    assert_eq!(state.telemetry_config, Configuration::new("1", 2));
    assert_eq!(state.status, ConfigStatus::Success);
    assert_eq!(agent.scheduler().period(), Some(Duration::from_secs(2)));

    let shutdown = timeout(Duration::from_secs(60), agent.into_channel().shutdown()).await;
    assert!(shutdown.is_ok(), "shutdown stopped responding");
}
