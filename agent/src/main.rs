use agent::{
    Agent, AgentError, ConfigStore,
    api::{self, ApiState},
    channel::mqtt::MqttChannel,
    config::{Config, DisplayKind, PeripheralsConfig},
    time::SystemClock,
};
use clap::Parser;
use log::{error, info};
use peripherals::{
    Display, SensorSource,
    serial::SerialDisplay,
    simulated::{ConsoleDisplay, SimulatedSensor},
};
use tokio::{net::TcpListener, sync::mpsc};

/// Telemetry agent
#[derive(Parser, Debug)]
#[command(version, about = "Samples sensors and reports telemetry", long_about = None)]
struct Args {
    /// Configuration file, without extension
    #[arg(short, long, default_value = "agent/config")]
    config: String,
}

fn build_display(config: &PeripheralsConfig) -> Result<Box<dyn Display + Send>, AgentError> {
    match (config.display, config.serial_port.as_deref()) {
        (DisplayKind::Serial, Some(port)) => {
            Ok(Box::new(SerialDisplay::new(port, config.baud_rate)?))
        }
        (DisplayKind::Serial, None) => Err(AgentError::InvalidConfig(
            "peripherals.serial_port is required for a serial display".to_string(),
        )),
        (DisplayKind::Console, _) => Ok(Box::new(ConsoleDisplay)),
    }
}

async fn run(config: Config) -> Result<(), AgentError> {
    let store = ConfigStore::new(config.device.default_send_frequency);
    let (desired_tx, desired_rx) = mpsc::unbounded_channel();

    let channel = MqttChannel::connect(&config.device.id, &config.mqtt, desired_tx.clone());
    let sensor: Box<dyn SensorSource + Send> = Box::new(SimulatedSensor::default());
    let display = build_display(&config.peripherals)?;

    let api_handle = match &config.api {
        Some(api_config) => {
            let address = api_config.address();
            let listener = TcpListener::bind(&address).await?;
            let router = api::router(ApiState {
                store: store.clone(),
                desired_tx,
            });

            info!("Swagger UI available at http://{}/docs", address);
            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, router).await {
                    error!("API server failed: {}", e);
                }
            }))
        }
        None => None,
    };

    let mut agent: Agent<_, _, _, SystemClock> = Agent::new(
        config.device.id.clone(),
        config.device.temperature_unit,
        sensor,
        display,
        channel,
        store,
    );

    agent
        .run(desired_rx, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    if let Some(handle) = api_handle {
        handle.abort();
    }
    agent.into_channel().shutdown().await;

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    let config = Config::load(&args.config).unwrap_or_else(|err| {
        error!("{}", err);
        error!("Please create {}.toml, see agent/config.toml for the format.", args.config);
        std::process::exit(1);
    });

    info!("Loaded configuration:");
    info!("  Device: {}", config.device.id);
    info!("  MQTT: {}:{}", config.mqtt.host, config.mqtt.port);
    info!(
        "  Default frequency: {}s, unit: {:?}",
        config.device.default_send_frequency, config.device.temperature_unit
    );

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
