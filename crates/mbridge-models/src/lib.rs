//! Shared data models for the MediaBridge job bridge.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs as handed over by the job runtime
//! - Upload specifications and produced artifacts
//! - Status events and the structured job outcome

pub mod event;
pub mod job;
pub mod upload;

// Re-export common types
pub use event::{JobOutcome, JobStatus, StatusEvent};
pub use job::{Job, JobId, JobInput};
pub use upload::{CloudCredentials, CloudType, Output, UploadSpec, UploadedArtifact};
