//! S3-backed [`ObjectStore`].
//!
//! Credentials and (unless configured) region come from the ambient AWS
//! provider chain: environment, shared profile, instance metadata.

use crate::config::StoreTarget;
use crate::error::{SyncError, SyncResult};
use crate::object_store::{ObjectStore, content_type_for};
use crate::types::NameSet;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

/// Object store over a single S3 bucket, treated as a flat key space.
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds a client for `target` from the ambient AWS configuration.
    pub async fn connect(target: &StoreTarget) -> SyncResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(ref region) = target.region {
            loader = loader.region(aws_types::region::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(ref endpoint) = target.endpoint_override {
            config_builder = config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        Ok(Self::new(
            S3Client::from_conf(config_builder.build()),
            target.bucket.clone(),
        ))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self) -> SyncResult<NameSet> {
        let mut keys = NameSet::new();
        let mut continuation: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| {
                    SyncError::Store(format!(
                        "list failed for bucket {}: {}",
                        self.bucket,
                        e.into_service_error()
                    ))
                })?;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(|k| k.to_string())),
            );

            match resp.next_continuation_token() {
                Some(token) if resp.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!("listed {} keys in s3://{}", keys.len(), self.bucket);
        Ok(keys)
    }

    async fn get_content(&self, key: &str) -> SyncResult<Vec<u8>> {
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    return Err(SyncError::NotFound(format!("s3://{}/{key}", self.bucket)));
                }
                return Err(SyncError::Store(format!(
                    "download failed for {key}: {service_err}"
                )));
            }
        };

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| SyncError::Store(format!("failed to read body for {key}: {e}")))?;

        let bytes = body.into_bytes().to_vec();
        debug!(
            "downloaded {} bytes from s3://{}/{key}",
            bytes.len(),
            self.bucket
        );
        Ok(bytes)
    }

    async fn put(&self, key: &str, content: Vec<u8>, content_type: Option<&str>) -> SyncResult<()> {
        let size = content.len();
        let content_type = content_type.unwrap_or_else(|| content_type_for(key));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| {
                SyncError::Store(format!("upload failed for {key}: {}", e.into_service_error()))
            })?;

        debug!("uploaded {size} bytes to s3://{}/{key}", self.bucket);
        Ok(())
    }

    async fn delete(&self, key: &str) -> SyncResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                SyncError::Store(format!("delete failed for {key}: {}", e.into_service_error()))
            })?;

        debug!("deleted s3://{}/{key}", self.bucket);
        Ok(())
    }
}
