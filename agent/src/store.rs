use std::sync::Arc;
use telemetry::{ConfigStatus, Configuration, ReportedDocument, ReportedState};
use tokio::sync::watch;

/// Shared handle to the device's [`ReportedState`].
///
/// Clones refer to the same state. Readers get consistent snapshots and can
/// subscribe to every change; only the sync controller mutates it, through
/// [`begin`](ConfigStore::begin) and [`commit`](ConfigStore::commit).
#[derive(Debug, Clone)]
pub struct ConfigStore {
    state: Arc<watch::Sender<ReportedState>>,
}

impl ConfigStore {
    /// Creates the store with configuration `"0"` at the given frequency, idle.
    pub fn new(default_send_frequency: u32) -> Self {
        let (state, _) = watch::channel(ReportedState::new(default_send_frequency));

        Self {
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> ReportedState {
        self.state.borrow().clone()
    }

    pub fn document(&self) -> ReportedDocument {
        ReportedDocument::from(&*self.state.borrow())
    }

    /// Frequency, in seconds, of the committed configuration.
    pub fn send_frequency(&self) -> u32 {
        self.state.borrow().send_frequency()
    }

    /// Receives every state the store goes through from now on.
    pub fn subscribe(&self) -> watch::Receiver<ReportedState> {
        self.state.subscribe()
    }

    /// Marks `desired` as being applied. Replaces any change still pending.
    pub(crate) fn begin(&self, desired: Configuration) -> ReportedState {
        self.state.send_modify(|state| {
            state.status = ConfigStatus::Pending(desired);
        });

        self.snapshot()
    }

    /// Makes the pending configuration the one in effect.
    ///
    /// Returns `None`, leaving the state untouched, if nothing is pending.
    pub(crate) fn commit(&self) -> Option<ReportedState> {
        let committed = self.state.send_if_modified(|state| {
            match std::mem::replace(&mut state.status, ConfigStatus::Success) {
                ConfigStatus::Pending(config) => {
                    state.telemetry_config = config;
                    true
                }
                previous => {
                    state.status = previous;
                    false
                }
            }
        });

        committed.then(|| self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry::state::StatusKind;

    #[test]
    fn starts_idle_with_default_frequency() {
        let store = ConfigStore::new(5);

        let state = store.snapshot();
        assert_eq!(state.telemetry_config, Configuration::new("0", 5));
        assert_eq!(state.status, ConfigStatus::Idle);
        assert_eq!(store.send_frequency(), 5);
    }

    #[test]
    fn begin_keeps_committed_config_until_commit() {
        let store = ConfigStore::new(5);

        let pending = store.begin(Configuration::new("1", 10));
        assert_eq!(pending.telemetry_config, Configuration::new("0", 5));
        assert_eq!(pending.pending_config(), Some(&Configuration::new("1", 10)));
        assert_eq!(store.send_frequency(), 5);

        let committed = store.commit().unwrap();
        assert_eq!(committed.telemetry_config, Configuration::new("1", 10));
        assert_eq!(committed.status, ConfigStatus::Success);
        assert!(committed.pending_config().is_none());
        assert_eq!(store.send_frequency(), 10);
    }

    #[test]
    fn commit_without_pending_change_does_nothing() {
        let store = ConfigStore::new(5);

        assert!(store.commit().is_none());
        assert_eq!(store.snapshot(), ReportedState::new(5));
    }

    #[test]
    fn clones_share_state() {
        let store = ConfigStore::new(5);
        let observer = store.clone();

        store.begin(Configuration::new("3", 7));
        store.commit();

        assert_eq!(observer.document().telemetry_config.config_id, "3");
        assert_eq!(
            observer.document().telemetry_config.status,
            StatusKind::Success
        );
    }

    #[tokio::test]
    async fn subscribers_see_pending_before_success() {
        let store = ConfigStore::new(5);
        let mut rx = store.subscribe();

        store.begin(Configuration::new("1", 10));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status.kind(), StatusKind::Pending);

        store.commit();
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.status, ConfigStatus::Success);
        assert_eq!(state.telemetry_config, Configuration::new("1", 10));
    }
}
