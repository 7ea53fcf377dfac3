//! AWS S3 remote sink.
//!
//! Credentials and region come from the standard AWS provider chain; the
//! config file only names the bucket, key prefix and optional region.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use log::info;

use crate::error::{AppError, Result};
use crate::models::RemoteConfig;
use crate::storage::{RemoteSink, Upload};

/// Uploads feed documents to an S3 bucket.
#[derive(Clone)]
pub struct S3Sink {
    client: Client,
    bucket: String,
}

impl S3Sink {
    /// Create a new S3 sink.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Create an S3 sink from the remote config and the environment's AWS settings.
    pub async fn from_config(config: &RemoteConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        Self::new(Client::new(&sdk_config), config.bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}

#[async_trait]
impl RemoteSink for S3Sink {
    async fn put_object(&self, upload: Upload) -> Result<String> {
        let size = upload.body.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&upload.key)
            .body(ByteStream::from(upload.body))
            .content_type(upload.content_type);
        if upload.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        let output = request
            .send()
            .await
            .map_err(|e| AppError::remote(DisplayErrorContext(&e)))?;

        let location = self.location(&upload.key);
        info!(
            "Wrote {} bytes to {} (etag {})",
            size,
            location,
            output.e_tag().unwrap_or("-")
        );
        Ok(location)
    }
}
