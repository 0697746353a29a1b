mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use futures::StreamExt;
use log::error;
use mqtt_client::{DeviceTopics, MqttReceiver, MqttSender};
use std::time::Duration;
use telemetry::{Configuration, DesiredDocument, ReportedDocument};
use tokio::time::timeout;

/// Telemetry agent CLI
#[derive(Parser, Debug)]
#[command(version, about = "Telemetry agent CLI", long_about = None)]
struct Args {
    /// Broker host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Broker port
    #[arg(long, default_value_t = 1883)]
    port: u16,

    /// Device to talk to
    #[arg(short, long)]
    device: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Request a new telemetry configuration
    #[command(name = "set-config")]
    SetConfig {
        /// Identifier of the new configuration revision
        #[arg(long)]
        id: String,
        /// Send frequency in seconds
        #[arg(long)]
        frequency: u32,
    },

    /// Print the last reported state
    #[command(name = "get-state")]
    GetState {
        /// Seconds to wait for a reported state
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },

    /// Print reported states and telemetry as they arrive
    Watch,
}

fn desired_config(id: &str, frequency: u32) -> Result<Configuration, CliError> {
    if id.trim().is_empty() {
        return Err(CliError::EmptyConfigId);
    }
    if frequency == 0 {
        return Err(CliError::InvalidFrequency);
    }

    Ok(Configuration::new(id.trim(), frequency))
}

fn describe_report(doc: &ReportedDocument) -> String {
    let config = &doc.telemetry_config;
    let mut text = format!(
        "config {} ({}s) {}",
        config.config_id, config.send_frequency, config.status
    );

    if let Some(pending) = &config.pending_config {
        text.push_str(&format!(
            " -> {} ({}s)",
            pending.config_id, pending.send_frequency
        ));
    }

    text
}

fn connect(args: &Args) -> (MqttSender, MqttReceiver) {
    let options = mqtt_client::options("agent-cli", &args.host, args.port, Duration::from_secs(30));
    let (sender, eventloop) = MqttSender::new(options);
    let receiver = MqttReceiver::from_client(sender.client(), eventloop);

    (sender, receiver)
}

async fn set_config(args: &Args, id: &str, frequency: u32) -> Result<(), CliError> {
    let config = desired_config(id, frequency)?;
    let payload = DesiredDocument::new(config).to_json()?;
    let topics = DeviceTopics::new(&args.device);
    let (sender, mut receiver) = connect(args);

    sender.publish_retained(&topics.desired, &payload).await?;
    timeout(Duration::from_secs(10), receiver.wait_for_puback())
        .await
        .map_err(|_| CliError::Timeout)??;

    println!("Requested {} on {}", payload, args.device);
    sender.disconnect().await?;
    Ok(())
}

async fn get_state(args: &Args, seconds: u64) -> Result<(), CliError> {
    let topics = DeviceTopics::new(&args.device);
    let (sender, mut receiver) = connect(args);
    receiver.subscribe(&topics.reported);

    let msg = timeout(Duration::from_secs(seconds), receiver.next_message())
        .await
        .map_err(|_| CliError::Timeout)?;
    let doc: ReportedDocument = serde_json::from_slice(&msg.payload)?;

    println!("{}", describe_report(&doc));
    println!("{}", serde_json::to_string_pretty(&doc)?);
    sender.disconnect().await?;
    Ok(())
}

async fn watch(args: &Args) {
    let topics = DeviceTopics::new(&args.device);
    let (_sender, mut receiver) = connect(args);
    receiver.subscribe(&topics.reported);
    receiver.subscribe(&topics.events);

    println!("Watching {}, Ctrl-C to stop", args.device);
    let mut messages = Box::pin(receiver.into_stream());
    while let Some(msg) = messages.next().await {
        if msg.topic == topics.reported {
            match serde_json::from_slice::<ReportedDocument>(&msg.payload) {
                Ok(doc) => println!("[reported] {}", describe_report(&doc)),
                Err(e) => error!("Unreadable reported state: {}", e),
            }
        } else {
            println!("[telemetry] {}", String::from_utf8_lossy(&msg.payload));
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let args = Args::parse();

    let result = match &args.command {
        Commands::SetConfig { id, frequency } => set_config(&args, id, *frequency).await,
        Commands::GetState { timeout } => get_state(&args, *timeout).await,
        Commands::Watch => {
            watch(&args).await;
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
