//! Artifact upload routing and cloud object store client.
//!
//! This crate provides:
//! - The `ObjectStore` collaborator trait (physical transfer + local cleanup)
//! - A production implementation for GCS and S3-compatible endpoints
//! - The `UploadRouter` that derives per-output storage keys

pub mod error;
pub mod router;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use router::UploadRouter;
pub use store::{CloudObjectStore, ObjectStore};
