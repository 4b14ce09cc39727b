use crate::config::ArchiveConfig;
use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use aws_sdk_s3::config::{Config as S3Config, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client as S3Client;

/// Archive bucket on S3. Uploads overwrite any existing object at the key.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Client from the ambient AWS environment, narrowed by the `[archive]` overrides.
    pub async fn from_archive_config(archive: &ArchiveConfig) -> Self {
        let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(
            S3Client::from_conf(s3_config(&shared, archive)),
            archive.bucket.clone(),
        )
    }
}

pub(crate) fn s3_config(shared: &aws_config::SdkConfig, archive: &ArchiveConfig) -> S3Config {
    let mut builder = aws_sdk_s3::config::Builder::from(shared);

    // 未設定時沿用 AWS_REGION
    if let Some(region) = &archive.region {
        builder = builder.region(Region::new(region.clone()));
    }
    // 自架相容服務才需要 path-style
    if let Some(endpoint) = &archive.endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }

    builder.build()
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| EtlError::ObjectStoreError {
                message: format!("Failed to read s3://{}/{}: {}", self.bucket, path, e),
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| EtlError::ObjectStoreError {
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        tracing::info!("Inserting data in bucket: {}", self.bucket);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type("application/json")
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                EtlError::ObjectStoreError {
                    message: format!(
                        "Failed to write s3://{}/{} ({}): {}",
                        self.bucket,
                        path,
                        service_err.code().unwrap_or("unknown"),
                        service_err
                    ),
                }
            })?;

        Ok(())
    }
}
