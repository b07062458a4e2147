//! Upload routing: per-output storage keys.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use mbridge_models::{Output, UploadSpec, UploadedArtifact};

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Routes worker outputs to storage keys and delegates the transfer.
///
/// Key derivation only; the physical upload and local-file cleanup belong
/// to the `ObjectStore` collaborator.
pub struct UploadRouter {
    store: Arc<dyn ObjectStore>,
}

impl UploadRouter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Derive the storage key for each output, preserving output order.
    ///
    /// A single output whose spec key carries a dot uploads under the key
    /// verbatim (the key names an explicit filename). Everything else goes
    /// under the key's pre-dot prefix plus the output filename.
    pub fn destination_keys(outputs: &[Output], spec_key: &str) -> Vec<String> {
        if outputs.len() == 1 && spec_key.contains('.') {
            return vec![spec_key.to_string()];
        }

        let prefix = spec_key.split('.').next().unwrap_or(spec_key);
        outputs
            .iter()
            .map(|output| format!("{}/{}", prefix, output.filename))
            .collect()
    }

    /// Upload every output under its derived key.
    ///
    /// Returns one artifact triple per output, in output order.
    pub async fn upload_outputs(
        &self,
        outputs: &[Output],
        spec: &UploadSpec,
    ) -> StorageResult<Vec<UploadedArtifact>> {
        if spec.key.is_empty() {
            return Err(StorageError::invalid_key("upload key is empty"));
        }

        let keys = Self::destination_keys(outputs, &spec.key);
        let mut artifacts = Vec::with_capacity(outputs.len());

        for (output, key) in outputs.iter().zip(keys) {
            debug!("Routing {} to {}/{}", output.filename, spec.bucket, key);

            let url = self
                .store
                .upload(
                    &spec.bucket,
                    &key,
                    Path::new(&output.local_path),
                    spec.cloud_type,
                    spec.credentials.as_ref(),
                )
                .await?;

            artifacts.push(UploadedArtifact {
                name: output.filename.clone(),
                path: key,
                url,
            });
        }

        Ok(artifacts)
    }
}
