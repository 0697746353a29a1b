use super::TelemetryChannel;
use crate::error::TransportError;
use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};
use telemetry::{ReportedDocument, TelemetryMessage};

/// Something the agent sent out.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Telemetry(TelemetryMessage),
    Reported(ReportedDocument),
}

/// In-memory channel that records everything sent through it.
///
/// Clones share the same record, so a test can keep one while the agent owns
/// the other.
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    sent: Arc<Mutex<Vec<Sent>>>,
    inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
    acked: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_publish: Arc<AtomicBool>,
    fail_report: Arc<AtomicBool>,
    fail_receive: Arc<AtomicBool>,
    fail_ack: Arc<AtomicBool>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a cloud-to-device message.
    pub fn push_inbound(&self, payload: &[u8]) {
        self.inbound.lock().unwrap().push_back(payload.to_vec());
    }

    /// Makes telemetry publishes fail until turned off again.
    pub fn fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Makes reported state publishes fail until turned off again.
    pub fn fail_report(&self, fail: bool) {
        self.fail_report.store(fail, Ordering::SeqCst);
    }

    /// Makes receiving fail, leaving inbound messages queued.
    pub fn fail_receive(&self, fail: bool) {
        self.fail_receive.store(fail, Ordering::SeqCst);
    }

    /// Makes acknowledgements fail. The message is still consumed.
    pub fn fail_ack(&self, fail: bool) {
        self.fail_ack.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn telemetry(&self) -> Vec<TelemetryMessage> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Telemetry(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    pub fn reports(&self) -> Vec<ReportedDocument> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Reported(doc) => Some(doc),
                _ => None,
            })
            .collect()
    }

    pub fn acked(&self) -> Vec<Vec<u8>> {
        self.acked.lock().unwrap().clone()
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.lock().unwrap().len()
    }
}

#[async_trait]
impl TelemetryChannel for MockChannel {
    type Message = Vec<u8>;

    async fn publish(&self, message: &TelemetryMessage) -> Result<(), TransportError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(TransportError::Other("publish rejected".to_string()));
        }

        self.sent
            .lock()
            .unwrap()
            .push(Sent::Telemetry(message.clone()));
        Ok(())
    }

    async fn try_receive(&mut self) -> Result<Option<Self::Message>, TransportError> {
        if self.fail_receive.load(Ordering::SeqCst) {
            return Err(TransportError::Other("receive failed".to_string()));
        }

        Ok(self.inbound.lock().unwrap().pop_front())
    }

    async fn acknowledge(&mut self, message: Self::Message) -> Result<(), TransportError> {
        if self.fail_ack.load(Ordering::SeqCst) {
            return Err(TransportError::Other("acknowledge rejected".to_string()));
        }

        self.acked.lock().unwrap().push(message);
        Ok(())
    }

    async fn publish_reported_state(
        &self,
        document: &ReportedDocument,
    ) -> Result<(), TransportError> {
        if self.fail_report.load(Ordering::SeqCst) {
            return Err(TransportError::Other("report rejected".to_string()));
        }

        self.sent
            .lock()
            .unwrap()
            .push(Sent::Reported(document.clone()));
        Ok(())
    }
}
