//! Cloud object store implementations.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use tracing::{debug, info};

use mbridge_models::{CloudCredentials, CloudType};

use crate::error::{StorageError, StorageResult};

const GCS_UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1";
const GCS_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// Collaborator performing the physical upload and local cleanup.
///
/// A successful upload deletes the local file. The returned URL is absent
/// for providers without a default public URL scheme.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        cloud_type: CloudType,
        credentials: Option<&CloudCredentials>,
    ) -> StorageResult<Option<String>>;
}

/// Production object store for GCS and S3-compatible endpoints.
///
/// Clients are built per call from the job's credentials; the per-job
/// credential model means no long-lived provider session exists to reuse.
pub struct CloudObjectStore {
    http: reqwest::Client,
}

impl Default for CloudObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudObjectStore {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn upload_s3(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        credentials: Option<&CloudCredentials>,
    ) -> StorageResult<Option<String>> {
        debug!("Uploading {} to s3://{}/{}", local_path.display(), bucket, key);

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        let client = Self::s3_client(credentials).await;

        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to s3://{}/{}", local_path.display(), bucket, key);

        Ok(s3_public_url(bucket, key, credentials))
    }

    async fn s3_client(credentials: Option<&CloudCredentials>) -> aws_sdk_s3::Client {
        let explicit = credentials.and_then(|c| {
            match (
                c.aws_access_key_id.as_deref(),
                c.aws_secret_access_key.as_deref(),
            ) {
                (Some(id), Some(secret)) => {
                    Some((c, Credentials::new(id, secret, None, None, "job")))
                }
                _ => None,
            }
        });

        match explicit {
            Some((c, creds)) => {
                let mut builder = Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .credentials_provider(creds);

                if let Some(endpoint) = c.aws_url.as_deref() {
                    // S3-compatible endpoints (R2, MinIO) take a synthetic region
                    builder = builder
                        .endpoint_url(endpoint)
                        .region(Region::new("auto"))
                        .force_path_style(true);
                } else {
                    let region = c
                        .region_name
                        .clone()
                        .unwrap_or_else(|| "us-east-1".to_string());
                    builder = builder.region(Region::new(region));
                }

                aws_sdk_s3::Client::from_conf(builder.build())
            }
            None => {
                let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
                aws_sdk_s3::Client::new(&sdk_config)
            }
        }
    }

    async fn upload_gcs(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        credentials: Option<&CloudCredentials>,
    ) -> StorageResult<Option<String>> {
        debug!("Uploading {} to gs://{}/{}", local_path.display(), bucket, key);

        let provider: Arc<dyn TokenProvider> =
            match credentials.and_then(|c| c.service_account_json.as_deref()) {
                Some(json) => Arc::new(
                    CustomServiceAccount::from_json(json)
                        .map_err(|e| StorageError::auth(e.to_string()))?,
                ),
                None => gcp_auth::provider()
                    .await
                    .map_err(|e| StorageError::auth(e.to_string()))?,
            };

        let token = provider
            .token(&[GCS_SCOPE])
            .await
            .map_err(|e| StorageError::auth(e.to_string()))?;

        let data = tokio::fs::read(local_path).await?;

        let url = format!(
            "{}/b/{}/o?uploadType=media&name={}",
            GCS_UPLOAD_BASE,
            bucket,
            urlencoding::encode(key)
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::upload_failed(format!(
                "GCS returned {}: {}",
                status, body
            )));
        }

        info!("Uploaded {} to gs://{}/{}", local_path.display(), bucket, key);

        Ok(Some(format!(
            "https://storage.googleapis.com/{}/{}",
            bucket, key
        )))
    }
}

#[async_trait]
impl ObjectStore for CloudObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        cloud_type: CloudType,
        credentials: Option<&CloudCredentials>,
    ) -> StorageResult<Option<String>> {
        let url = match cloud_type {
            CloudType::Aws => self.upload_s3(bucket, key, local_path, credentials).await?,
            CloudType::Gcp => self.upload_gcs(bucket, key, local_path, credentials).await?,
        };

        tokio::fs::remove_file(local_path).await?;

        Ok(url)
    }
}

/// Public URL for an object uploaded to an S3-compatible target.
///
/// Custom endpoints without a public URL prefix have no default scheme,
/// so the URL is absent.
fn s3_public_url(
    bucket: &str,
    key: &str,
    credentials: Option<&CloudCredentials>,
) -> Option<String> {
    if let Some(public) = credentials.and_then(|c| c.aws_public_url.as_deref()) {
        return Some(format!("{}/{}", public.trim_end_matches('/'), key));
    }

    if credentials.is_some_and(|c| c.aws_url.is_some()) {
        return None;
    }

    let region = credentials
        .and_then(|c| c.region_name.as_deref())
        .unwrap_or("us-east-1");

    Some(format!(
        "https://{}.s3.{}.amazonaws.com/{}",
        bucket, region, key
    ))
}
