use crate::{
    channel::{DesiredPush, TelemetryChannel},
    scheduler::{Scheduler, period_from_secs},
    store::ConfigStore,
    sync::{ConfigSync, SyncOutcome},
    time::{SystemClock, TimeProvider},
};
use chrono::{DateTime, Local};
use log::{debug, error, info};
use peripherals::{Display, SensorSource, dial_to_channel};
use std::{future::Future, marker::PhantomData};
use telemetry::{TelemetryMessage, units::TemperatureUnit};
use tokio::{select, sync::mpsc::UnboundedReceiver};

/// Formats the line shown on the display.
pub fn status_line(temperature: f64, now: DateTime<Local>) -> String {
    format!("Temp: {:.2}     Now:  {}", temperature, now.format("%-H:%M:%S"))
}

/// The device: samples, displays and publishes on every tick, and applies
/// desired configuration pushes in between.
pub struct Agent<S, D, C, T = SystemClock> {
    device_id: String,
    unit: TemperatureUnit,
    sensor: S,
    display: D,
    channel: C,
    scheduler: Scheduler,
    sync: ConfigSync,
    clock: PhantomData<T>,
}

impl<S, D, C, T> Agent<S, D, C, T>
where
    S: SensorSource,
    D: Display,
    C: TelemetryChannel,
    T: TimeProvider,
{
    pub fn new(
        device_id: impl Into<String>,
        unit: TemperatureUnit,
        sensor: S,
        display: D,
        channel: C,
        store: ConfigStore,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            unit,
            sensor,
            display,
            channel,
            scheduler: Scheduler::new(),
            sync: ConfigSync::new(store),
            clock: PhantomData,
        }
    }

    pub fn store(&self) -> ConfigStore {
        self.sync.store().clone()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Reports the initial state and arms the timer at the committed frequency.
    ///
    /// # Panics
    ///
    /// Panics if the agent was already started.
    pub async fn start(&mut self) {
        self.sync.init_report(&self.channel).await;

        let period = period_from_secs(self.sync.store().send_frequency());
        self.scheduler.start(period);
    }

    /// One sampling cycle: read, display, publish, then take at most one
    /// inbound message.
    pub async fn tick(&mut self) {
        let reading = self.sensor.read();
        let temperature = self.unit.from_celsius(reading.temperature_celsius);

        let text = status_line(temperature, T::now());
        debug!("Sensor text: {}", text);
        self.display.write(&text);
        self.display
            .set_backlight(124, dial_to_channel(reading.aux_dial), 65);

        let message = TelemetryMessage::new(&self.device_id, temperature, reading.humidity);
        match self.channel.publish(&message).await {
            Ok(()) => info!("Sent telemetry: {:?}", message),
            Err(e) => error!("Failed to send telemetry: {}", e),
        }

        self.drain_inbound().await;
    }

    /// Applies a desired configuration push.
    pub async fn handle_push(&mut self, desired: DesiredPush) -> SyncOutcome {
        self.sync
            .on_desired_config_pushed(desired, &self.channel, &mut self.scheduler)
            .await
    }

    /// Runs until `shutdown` completes.
    ///
    /// Ticks and pushes are handled one at a time; a push arriving during a
    /// tick waits in `desired` until the tick is done.
    ///
    /// # Panics
    ///
    /// Panics if the agent was already started.
    pub async fn run(
        &mut self,
        mut desired: UnboundedReceiver<DesiredPush>,
        shutdown: impl Future<Output = ()>,
    ) {
        self.start().await;
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping agent");
                    break;
                }
                Some(push) = desired.recv() => {
                    self.handle_push(push).await;
                }
                _ = self.scheduler.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    async fn drain_inbound(&mut self) {
        let msg = match self.channel.try_receive().await {
            Ok(Some(msg)) => msg,
            Ok(None) => return,
            Err(e) => {
                error!("Failed to receive message: {}", e);
                return;
            }
        };

        info!("Received message: {}", String::from_utf8_lossy(msg.as_ref()));

        if let Err(e) = self.channel.acknowledge(msg).await {
            error!("Failed to acknowledge message: {}", e);
        }
    }
}
