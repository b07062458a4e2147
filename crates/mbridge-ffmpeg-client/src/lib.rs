//! HTTP client for the local FFmpeg worker API.
//!
//! This crate provides:
//! - Readiness probing against the worker's health endpoint
//! - Long-bound request forwarding with typed failure classification

pub mod client;
pub mod error;
pub mod types;

pub use client::{FfmpegClient, FfmpegClientConfig};
pub use error::{DownstreamError, DownstreamResult};
pub use types::WorkerResponse;
