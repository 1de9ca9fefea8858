//! Resume file storage. Local filesystem by default, S3-compatible object
//! store when `STORAGE_BACKEND=s3`.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageBackend;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}

#[async_trait]
pub trait ResumeStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

/// Fresh storage key for an uploaded resume.
pub fn resume_key(extension: &str) -> String {
    if extension.is_empty() {
        format!("resumes/{}", Uuid::new_v4())
    } else {
        format!("resumes/{}.{extension}", Uuid::new_v4())
    }
}

pub async fn from_config(backend: &StorageBackend) -> Result<Arc<dyn ResumeStorage>, StorageError> {
    match backend {
        StorageBackend::Local { root } => {
            tokio::fs::create_dir_all(root).await?;
            info!("Storing resumes under {root}");
            Ok(Arc::new(LocalStorage::new(root)))
        }
        StorageBackend::S3 {
            bucket,
            endpoint,
            region,
            access_key_id,
            secret_access_key,
        } => {
            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "screener-static",
            );

            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .credentials_provider(credentials);
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            let s3_config = loader.load().await;

            info!("Storing resumes in s3://{bucket}");
            Ok(Arc::new(S3Storage {
                client: aws_sdk_s3::Client::new(&s3_config),
                bucket: bucket.clone(),
            }))
        }
    }
}

pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys are relative paths; anything that could escape the root is refused.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ResumeStorage for LocalStorage {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::read(&path).await?)
    }
}

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

#[async_trait]
impl ResumeStorage for S3Storage {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("upload of {key} failed: {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("download of {key} failed: {e}")))?;
        let data = object
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("reading {key} failed: {e}")))?;
        Ok(data.into_bytes().to_vec())
    }
}
