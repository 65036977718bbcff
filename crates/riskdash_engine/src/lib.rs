//! Riskdash engine: backend gateway, polling timer and effect execution.
mod controller;
mod gateway;
mod scheduler;
mod types;

pub use controller::{ControllerSettings, ReconciliationController};
pub use gateway::{GatewaySettings, RemoteGateway, ReqwestGateway};
pub use scheduler::{PollingScheduler, ScopeTick, TickReceiver, DEFAULT_POLL_INTERVAL};
pub use types::{DocumentUpload, FailureKind, GatewayError, RequestFailure};
