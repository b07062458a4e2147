//! Upload placement types and produced artifacts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Target cloud provider for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum CloudType {
    /// Google Cloud Storage
    #[default]
    #[serde(rename = "GCP")]
    Gcp,
    /// S3 or an S3-compatible endpoint
    #[serde(rename = "AWS")]
    Aws,
}

impl CloudType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudType::Gcp => "GCP",
            CloudType::Aws => "AWS",
        }
    }
}

/// Per-job storage credentials carried inside the upload spec.
///
/// All fields are optional; absent credentials fall back to the ambient
/// provider chain of the target cloud.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CloudCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_access_key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_secret_access_key: Option<String>,

    /// Custom S3-compatible endpoint (R2, MinIO, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_url: Option<String>,

    /// Public URL prefix for buckets served behind a CDN or custom domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_public_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,

    /// Service account JSON document for GCS uploads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_json: Option<String>,
}

/// Where the worker's output artifacts should be placed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadSpec {
    /// Destination bucket
    pub bucket: String,
    /// Destination key; may carry an explicit filename extension
    pub key: String,
    /// Target cloud
    #[serde(default)]
    pub cloud_type: CloudType,
    /// Per-job credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CloudCredentials>,
}

/// One artifact produced by the media worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Output {
    /// Artifact filename as reported by the worker
    pub filename: String,
    /// Local path of the artifact on the worker host
    #[serde(rename = "path")]
    pub local_path: String,
}

/// An uploaded artifact as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadedArtifact {
    /// Artifact filename
    pub name: String,
    /// Storage key the artifact was uploaded under
    pub path: String,
    /// Public URL, when the provider has a default URL scheme
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_type_wire_names() {
        assert_eq!(serde_json::to_string(&CloudType::Gcp).unwrap(), "\"GCP\"");
        assert_eq!(serde_json::to_string(&CloudType::Aws).unwrap(), "\"AWS\"");

        let t: CloudType = serde_json::from_str("\"AWS\"").unwrap();
        assert_eq!(t, CloudType::Aws);
    }

    #[test]
    fn test_upload_spec_defaults_to_gcp() {
        let spec: UploadSpec = serde_json::from_value(serde_json::json!({
            "bucket": "media",
            "key": "out/video.mp4"
        }))
        .unwrap();

        assert_eq!(spec.cloud_type, CloudType::Gcp);
        assert!(spec.credentials.is_none());
    }

    #[test]
    fn test_output_wire_name_is_path() {
        let out: Output = serde_json::from_value(serde_json::json!({
            "filename": "a.mp4",
            "path": "/tmp/a.mp4"
        }))
        .unwrap();

        assert_eq!(out.local_path, "/tmp/a.mp4");
        let back = serde_json::to_value(&out).unwrap();
        assert_eq!(back["path"], "/tmp/a.mp4");
    }
}
