//! Object storage collaborator for captured product images.
//!
//! Uploaded images back the `product_image_url` on comparison records,
//! so the store must return a publicly fetchable URL. Product photos
//! are public by design; nothing sensitive is stored here.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Object storage seam.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an image, returning its public URL.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, ProviderError>;
}

/// S3-backed object store.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    /// Public base URL of the bucket, e.g.
    /// `https://my-bucket.s3.ap-northeast-2.amazonaws.com`.
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self { client, bucket, public_base_url }
    }

    /// Build from the ambient AWS environment plus `S3_BUCKET` /
    /// `S3_PUBLIC_BASE_URL`.
    pub async fn from_env() -> Result<Self, ProviderError> {
        let bucket = std::env::var("S3_BUCKET").map_err(|_| ProviderError::Credentials {
            provider: "s3",
            detail: "S3_BUCKET not set",
        })?;
        let public_base_url =
            std::env::var("S3_PUBLIC_BASE_URL").map_err(|_| ProviderError::Credentials {
                provider: "s3",
                detail: "S3_PUBLIC_BASE_URL not set",
            })?;

        let config = aws_config::load_from_env().await;
        Ok(Self::new(aws_sdk_s3::Client::new(&config), bucket, public_base_url))
    }

    /// Key layout: `uploads/{uuid}-{sanitized filename}`.
    fn object_key(filename: &str) -> String {
        let safe: String = filename
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        format!("uploads/{}-{}", uuid::Uuid::new_v4(), safe)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, ProviderError> {
        let key = Self::object_key(filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(mime_type)
            .body(aws_sdk_s3::primitives::ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ProviderError::Api {
                provider: "s3",
                status: 0,
                body: e.to_string(),
            })?;

        let url = format!("{}/{}", self.public_base_url.trim_end_matches('/'), key);
        tracing::debug!(key = %key, "image uploaded to object storage");
        Ok(url)
    }
}
