//! Job bridge handler.
//!
//! This crate composes the per-job lifecycle:
//! - Admission control from the recent arrival rate
//! - Readiness gating against the FFmpeg worker
//! - Request forwarding and artifact upload routing
//! - Status dispatch to the job runtime and an optional callback URL

pub mod callback;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod health;
pub mod orchestrator;
pub mod rate;

pub use callback::{CallbackDispatcher, ProgressSink, TracingProgressSink};
pub use concurrency::{ConcurrencyController, ConcurrencySettings};
pub use config::HandlerConfig;
pub use error::{HandlerError, HandlerResult};
pub use health::{GateStatus, HealthGate, ReadinessProbe};
pub use orchestrator::JobOrchestrator;
pub use rate::RateTracker;
