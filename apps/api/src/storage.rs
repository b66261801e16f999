use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use recruit_forms::ResumeFormat;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// A resume that already passed type and size checks.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub format: ResumeFormat,
    pub bytes: Bytes,
}

#[async_trait]
pub trait ResumeStorage: Send + Sync {
    /// Stores the file and returns the URL it can be fetched from.
    async fn store(&self, upload: &ResumeUpload) -> Result<String, AppError>;
}

/// Stores resumes in S3 (or MinIO) under `resumes/{uuid}.{ext}`.
#[derive(Clone)]
pub struct S3ResumeStorage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3ResumeStorage {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

pub fn object_key(format: ResumeFormat) -> String {
    format!("resumes/{}.{}", Uuid::new_v4(), format.extension())
}

#[async_trait]
impl ResumeStorage for S3ResumeStorage {
    async fn store(&self, upload: &ResumeUpload) -> Result<String, AppError> {
        let key = object_key(upload.format);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(upload.format.content_type())
            .content_disposition(format!(
                "inline; filename=\"{}\"",
                upload.file_name.replace('"', "")
            ))
            .body(ByteStream::from(upload.bytes.clone()))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload resume {key}: {e}")))?;

        info!(key = %key, size = upload.bytes.len(), "Resume stored");
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}
