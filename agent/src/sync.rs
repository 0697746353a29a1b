//! Reconciliation of desired configuration pushes against the reported state.
//!
//! An accepted push goes through two published states: `Pending`, carrying
//! the configuration being applied, then `Success` once it is committed and
//! the scheduler runs at the new period. Publish failures are logged and
//! never undo a state change.

use crate::{
    channel::{DesiredPush, TelemetryChannel},
    scheduler::{Scheduler, period_from_secs},
    store::ConfigStore,
};
use log::{debug, error, info};
use telemetry::{Configuration, ReportedDocument, ReportedState};

/// What a desired configuration push led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing usable, or the configuration already in effect.
    Unchanged,
    /// The configuration was committed and the scheduler restarted.
    Applied(Configuration),
}

pub struct ConfigSync {
    store: ConfigStore,
}

impl ConfigSync {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Publishes the state the device starts with.
    pub async fn init_report<C: TelemetryChannel>(&self, channel: &C) {
        let state = self.store.snapshot();
        info!(
            "Reporting initial config {} ({}s)",
            state.telemetry_config.config_id, state.telemetry_config.send_frequency
        );

        report(channel, &state).await;
    }

    /// Handles a desired configuration pushed by the remote side.
    ///
    /// Pushes for the committed configuration are ignored. A push for the
    /// configuration currently pending is applied again.
    pub async fn on_desired_config_pushed<C: TelemetryChannel>(
        &mut self,
        desired: DesiredPush,
        channel: &C,
        scheduler: &mut Scheduler,
    ) -> SyncOutcome {
        let Some(desired) = desired else {
            debug!("Desired push without telemetry config, nothing to do");
            return SyncOutcome::Unchanged;
        };

        let current = self.store.snapshot();
        if desired.config_id == current.telemetry_config.config_id {
            debug!("Config {} already applied", desired.config_id);
            return SyncOutcome::Unchanged;
        }

        info!(
            "Applying config {} ({}s), replacing {} ({}s)",
            desired.config_id,
            desired.send_frequency,
            current.telemetry_config.config_id,
            current.telemetry_config.send_frequency
        );

        let pending = self.store.begin(desired);
        report(channel, &pending).await;

        match self.complete_config_change(channel, scheduler).await {
            Some(config) => SyncOutcome::Applied(config),
            None => SyncOutcome::Unchanged,
        }
    }

    /// Commits the pending configuration, publishes it and restarts the
    /// scheduler at its frequency.
    ///
    /// Returns the committed configuration, or `None` if nothing was pending.
    pub async fn complete_config_change<C: TelemetryChannel>(
        &mut self,
        channel: &C,
        scheduler: &mut Scheduler,
    ) -> Option<Configuration> {
        let committed = self.store.commit()?;
        let config = committed.telemetry_config.clone();

        // Restart before publishing, so the reported frequency is the one
        // in use from the moment `Success` can be seen.
        scheduler.restart(period_from_secs(config.send_frequency));
        report(channel, &committed).await;

        info!(
            "Config {} applied, sending every {}s",
            config.config_id, config.send_frequency
        );
        Some(config)
    }
}

async fn report<C: TelemetryChannel>(channel: &C, state: &ReportedState) {
    let document = ReportedDocument::from(state);

    if let Err(e) = channel.publish_reported_state(&document).await {
        error!(
            "Failed to report state {} for config {}: {}",
            document.telemetry_config.status, document.telemetry_config.config_id, e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::MockChannel;
    use std::time::Duration;
    use telemetry::{ConfigStatus, state::StatusKind};

    fn running_scheduler(seconds: u64) -> Scheduler {
        let mut scheduler = Scheduler::new();
        scheduler.start(Duration::from_secs(seconds));
        scheduler
    }

    #[tokio::test]
    async fn init_report_publishes_idle_state() {
        let channel = MockChannel::new();
        let sync = ConfigSync::new(ConfigStore::new(5));

        sync.init_report(&channel).await;

        let reports = channel.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].telemetry_config.config_id, "0");
        assert_eq!(reports[0].telemetry_config.send_frequency, 5);
        assert_eq!(reports[0].telemetry_config.status, StatusKind::Idle);
        assert!(reports[0].telemetry_config.pending_config.is_none());
    }

    #[tokio::test]
    async fn init_report_failure_is_not_fatal() {
        let channel = MockChannel::new();
        channel.fail_report(true);
        let sync = ConfigSync::new(ConfigStore::new(5));

        sync.init_report(&channel).await;

        assert!(channel.reports().is_empty());
        assert_eq!(sync.store().snapshot(), ReportedState::new(5));
    }

    #[tokio::test]
    async fn new_config_is_reported_pending_then_success() {
        let channel = MockChannel::new();
        let mut scheduler = running_scheduler(5);
        let mut sync = ConfigSync::new(ConfigStore::new(5));

        let outcome = sync
            .on_desired_config_pushed(
                Some(Configuration::new("1", 10)),
                &channel,
                &mut scheduler,
            )
            .await;

        assert_eq!(outcome, SyncOutcome::Applied(Configuration::new("1", 10)));

        let reports = channel.reports();
        assert_eq!(reports.len(), 2);

        let pending = &reports[0].telemetry_config;
        assert_eq!(pending.status, StatusKind::Pending);
        assert_eq!(pending.config_id, "0");
        assert_eq!(pending.pending_config, Some(Configuration::new("1", 10)));

        let success = &reports[1].telemetry_config;
        assert_eq!(success.status, StatusKind::Success);
        assert_eq!(success.config_id, "1");
        assert_eq!(success.send_frequency, 10);
        assert!(success.pending_config.is_none());

        assert_eq!(scheduler.period(), Some(Duration::from_secs(10)));
        assert_eq!(sync.store().send_frequency(), 10);
    }

    #[tokio::test]
    async fn push_of_committed_config_is_ignored() {
        let channel = MockChannel::new();
        let mut scheduler = running_scheduler(5);
        let mut sync = ConfigSync::new(ConfigStore::new(5));

        // Same id as the initial config, different frequency: still a no-op.
        let outcome = sync
            .on_desired_config_pushed(
                Some(Configuration::new("0", 60)),
                &channel,
                &mut scheduler,
            )
            .await;

        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert!(channel.sent().is_empty());
        assert_eq!(scheduler.period(), Some(Duration::from_secs(5)));
        assert_eq!(sync.store().snapshot(), ReportedState::new(5));
    }

    #[tokio::test]
    async fn empty_push_is_ignored() {
        let channel = MockChannel::new();
        let mut scheduler = running_scheduler(5);
        let mut sync = ConfigSync::new(ConfigStore::new(5));

        let outcome = sync
            .on_desired_config_pushed(None, &channel, &mut scheduler)
            .await;

        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn push_matching_pending_config_runs_the_full_cycle() {
        let channel = MockChannel::new();
        let mut scheduler = running_scheduler(5);
        let store = ConfigStore::new(5);
        let mut sync = ConfigSync::new(store.clone());

        // Left pending, as if the commit had been interrupted.
        store.begin(Configuration::new("1", 10));

        let outcome = sync
            .on_desired_config_pushed(
                Some(Configuration::new("1", 10)),
                &channel,
                &mut scheduler,
            )
            .await;

        assert_eq!(outcome, SyncOutcome::Applied(Configuration::new("1", 10)));
        assert_eq!(channel.reports().len(), 2);
        assert_eq!(store.snapshot().status, ConfigStatus::Success);
    }

    #[tokio::test]
    async fn complete_without_pending_change_does_nothing() {
        let channel = MockChannel::new();
        let mut scheduler = running_scheduler(5);
        let mut sync = ConfigSync::new(ConfigStore::new(5));

        let committed = sync.complete_config_change(&channel, &mut scheduler).await;

        assert!(committed.is_none());
        assert!(channel.sent().is_empty());
        assert_eq!(scheduler.period(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn report_failures_do_not_roll_back() {
        let channel = MockChannel::new();
        channel.fail_report(true);
        let mut scheduler = running_scheduler(5);
        let mut sync = ConfigSync::new(ConfigStore::new(5));

        let outcome = sync
            .on_desired_config_pushed(
                Some(Configuration::new("4", 20)),
                &channel,
                &mut scheduler,
            )
            .await;

        assert_eq!(outcome, SyncOutcome::Applied(Configuration::new("4", 20)));
        assert_eq!(
            sync.store().snapshot().telemetry_config,
            Configuration::new("4", 20)
        );
        assert_eq!(scheduler.period(), Some(Duration::from_secs(20)));
    }
}
