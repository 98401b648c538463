use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, error, info};

use super::SnapshotStore;
use crate::config::MinioConfig;
use crate::error::{Error, Result};
use crate::models::MarketSnapshot;
use crate::utils::retry_with_backoff;

const SAVE_RETRIES: u32 = 3;
const SAVE_BASE_DELAY_MS: u64 = 250;

/// Snapshot stored as one JSON object in an S3-compatible bucket.
pub struct MinioSnapshotStore {
    client: S3Client,
    bucket: String,
    key: String,
}

fn storage_error(operation: &str, err: impl std::error::Error) -> Error {
    let context = DisplayErrorContext(&err).to_string();
    error!(operation = operation, error = %context, "MinIO request failed");
    Error::Storage(format!("MinIO {} failed: {}", operation, context))
}

impl MinioSnapshotStore {
    pub async fn new(config: &MinioConfig) -> Result<Self> {
        debug!(
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            region = %config.region,
            "Initializing MinIO snapshot store"
        );

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "static-credentials",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = S3Client::from_conf(s3_config);

        client
            .head_bucket()
            .bucket(&config.bucket)
            .send()
            .await
            .map_err(|e| storage_error("head_bucket", e))?;

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            key: config.object_key.clone(),
        })
    }
}

#[async_trait]
impl SnapshotStore for MinioSnapshotStore {
    async fn load(&self) -> Result<Option<MarketSnapshot>> {
        let output = match self.client.get_object().bucket(&self.bucket).key(&self.key).send().await {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|s| s.is_no_such_key()) => {
                info!(bucket = %self.bucket, key = %self.key, "No snapshot object yet");
                return Ok(None);
            }
            Err(e) => return Err(storage_error("get_object", e)),
        };

        let bytes = output.body.collect().await?.into_bytes();
        let snapshot: MarketSnapshot = serde_json::from_slice(&bytes)?;
        debug!(key = %self.key, crops = snapshot.crops.len(), "Snapshot loaded from MinIO");
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &MarketSnapshot) -> Result<()> {
        let body = serde_json::to_vec(snapshot)?;
        let size = body.len();
        let (client, bucket, key, body) = (&self.client, &self.bucket, &self.key, &body);

        retry_with_backoff(SAVE_RETRIES, SAVE_BASE_DELAY_MS, move || async move {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(body.clone()))
                .content_type("application/json")
                .send()
                .await
                .map_err(|e| storage_error("put_object", e))?;
            Ok(())
        })
        .await?;

        debug!(key = %self.key, bytes = size, "Snapshot uploaded to MinIO");
        Ok(())
    }
}
