use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod driver;
pub mod paths;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Failures reported by a storage driver.
///
/// Drivers translate their provider's error shapes into these two cases so
/// that callers never inspect provider-specific codes.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no such object: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Any other provider or network failure. `status` is the provider's HTTP
    /// status when one was received.
    #[error("{message}")]
    Provider { status: Option<u16>, message: String },
}

impl StorageError {
    pub fn not_found(bucket: &str, key: &str) -> Self {
        Self::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    pub fn no_such_bucket(bucket: &str) -> Self {
        Self::provider(
            Some(404),
            format!("NoSuchBucket: the specified bucket `{bucket}` does not exist"),
        )
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::provider(None, err.to_string())
    }
}

/// Full content of an object together with the metadata recorded by `store`.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
}

impl PutOptions {
    pub fn encoded(encoding: &str) -> Self {
        Self {
            content_type: None,
            content_encoding: Some(encoding.to_string()),
        }
    }

    /// The explicit content type, or one inferred from `key`.
    pub fn content_type_for(&self, key: &str) -> String {
        self.content_type
            .clone()
            .unwrap_or_else(|| content_type_for_key(key))
    }
}

/// Infers a `Content-Type` from the extension of `key`. Textual types carry
/// an explicit utf-8 charset; unknown extensions fall back to
/// [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for_key(key: &str) -> String {
    let Some(mime) = mime_guess::from_path(key).first() else {
        return DEFAULT_CONTENT_TYPE.to_string();
    };
    let textual = mime.type_() == mime_guess::mime::TEXT
        || matches!(
            mime.essence_str(),
            "application/javascript" | "application/json" | "application/xml"
        );
    if textual {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_string()
    }
}

/// Object store operations. Every call is one round-trip to the provider;
/// implementations keep no per-document state.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError>;
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: PutOptions,
    ) -> Result<(), StorageError>;
    /// Removing an absent key is reported as [`StorageError::NotFound`].
    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
    /// A single provider listing call; large buckets are truncated by the provider.
    async fn list(&self, bucket: &str) -> Result<Vec<ObjectEntry>, StorageError>;
}
