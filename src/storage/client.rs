use super::{ObjectStore, StoredObject};
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ObjectCannedAcl};
use aws_sdk_s3::{config::Region, Client as S3Client};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Upload part size. S3 rejects non-final multipart parts smaller than
/// 5 MiB, so payloads at or below one part go through a single put.
const PART_SIZE: usize = 5 * 1024 * 1024;

pub struct ObjectStoreClient {
    client: S3Client,
    bucket: String,
    base_url: String,
}

impl ObjectStoreClient {
    pub async fn new(
        access_key_id: String,
        secret_access_key: String,
        endpoint: String,
        bucket: String,
        base_url: String,
    ) -> Result<Self> {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "adpost-object-store",
        );

        // Custom config for S3-compatible stores (DigitalOcean Spaces etc.)
        let config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new("us-east-1")) // S3-compatible stores ignore the region
            .endpoint_url(endpoint)
            .load()
            .await;

        let client = S3Client::new(&config);

        Ok(Self {
            client,
            bucket,
            base_url,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    async fn put_single(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to upload object: {}", e)))?;
        Ok(())
    }

    async fn put_multipart(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
        progress: &(dyn Fn(f64) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<()> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to start multipart upload: {}", e)))?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| Error::Storage("Multipart upload returned no upload id".to_string()))?
            .to_string();

        let total = data.len();
        let mut sent = 0usize;
        let mut completed_parts = Vec::new();

        for (index, chunk) in data.chunks(PART_SIZE).enumerate() {
            if cancel.is_cancelled() {
                self.abort_upload(key, &upload_id).await;
                return Err(Error::Cancelled);
            }

            let part_number = (index + 1) as i32;
            let uploaded = match self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(&upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk.to_vec()))
                .send()
                .await
            {
                Ok(part) => part,
                Err(e) => {
                    self.abort_upload(key, &upload_id).await;
                    return Err(Error::Storage(format!(
                        "Failed to upload part {}: {}",
                        part_number, e
                    )));
                }
            };

            completed_parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .build(),
            );

            sent += chunk.len();
            progress(sent as f64 / total as f64 * 100.0);
        }

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed_parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to complete multipart upload: {}", e)))?;

        Ok(())
    }

    async fn abort_upload(&self, key: &str, upload_id: &str) {
        if let Err(e) = self
            .client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
        {
            warn!("Failed to abort multipart upload for {}: {}", key, e);
        }
    }
}

#[async_trait]
impl ObjectStore for ObjectStoreClient {
    async fn store(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
        progress: &(dyn Fn(f64) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<StoredObject> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        progress(0.0);

        // A repeated key overwrites the existing object, matching plain S3
        // put semantics.
        if data.len() <= PART_SIZE {
            self.put_single(key, data, content_type).await?;
        } else {
            self.put_multipart(key, data, content_type, progress, cancel)
                .await?;
        }

        progress(100.0);

        Ok(StoredObject {
            key: key.to_string(),
        })
    }

    async fn resolve_url(&self, object: &StoredObject) -> Result<String> {
        Ok(self.public_url(&object.key))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if let Some(service_error) = e.as_service_error() {
                    if service_error.is_not_found() {
                        return Ok(false);
                    }
                }
                Err(Error::Storage(format!("Failed to check object: {}", e)))
            }
        }
    }
}
