pub mod agent;
pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod store;
pub mod sync;
pub mod time;

pub use agent::Agent;
pub use channel::{DesiredPush, TelemetryChannel};
pub use error::{AgentError, TransportError};
pub use scheduler::Scheduler;
pub use store::ConfigStore;
pub use sync::{ConfigSync, SyncOutcome};
