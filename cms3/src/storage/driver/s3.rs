//! S3 driver built on aws-sdk-s3.
//!
//! One [`Client`] is built at startup and shared by every request. Requests
//! run with the SDK's default timeout and retry settings. This driver adds no
//! policy of its own; harden here against a slow or flaky provider.

use crate::storage::{ObjectEntry, PutOptions, Storage, StorageError, StoredObject};

use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::Object;
use bytes::Bytes;
use chrono::{DateTime, Utc};

pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(client: Client) -> Self {
        S3Storage { client }
    }

    /// Builds a client from the default AWS credential chain. A custom
    /// endpoint (MinIO, RustFS, ...) switches to path-style addressing.
    pub async fn connect(region: &str, endpoint_url: Option<&str>) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint_url {
            tracing::debug!("Using custom S3 endpoint: {endpoint}");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()))
    }
}

/// Maps any SDK failure that is not a typed not-found onto a provider error,
/// keeping the HTTP status the provider answered with.
fn provider_error<E>(err: SdkError<E>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|raw| raw.status().as_u16());
    let message = match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        _ => DisplayErrorContext(&err).to_string(),
    };
    StorageError::provider(status, message)
}

impl S3Storage {
    /// HEAD answers a bare 404 both for a missing key and a missing bucket,
    /// so the bucket is probed to tell them apart.
    async fn missing_object(&self, bucket: &str, key: &str) -> StorageError {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => StorageError::not_found(bucket, key),
            Err(SdkError::ServiceError(error)) if error.err().is_not_found() => {
                StorageError::no_such_bucket(bucket)
            }
            Err(err) => provider_error(err),
        }
    }
}

fn entry_from_object(object: &Object) -> Option<ObjectEntry> {
    let key = object.key()?.to_string();
    Some(ObjectEntry {
        key,
        size: object.size().and_then(|size| u64::try_from(size).ok()),
        last_modified: object
            .last_modified()
            .and_then(|at| DateTime::<Utc>::from_timestamp(at.secs(), at.subsec_nanos())),
    })
}

#[async_trait::async_trait]
impl Storage for S3Storage {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;
        let output = match response {
            Ok(output) => output,
            Err(SdkError::ServiceError(error)) if error.err().is_no_such_key() => {
                return Err(StorageError::not_found(bucket, key));
            }
            Err(err) => return Err(provider_error(err)),
        };

        let content_type = output.content_type().map(str::to_string);
        let content_encoding = output.content_encoding().map(str::to_string);
        let body = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::provider(None, err.to_string()))?
            .into_bytes();

        Ok(StoredObject {
            body,
            content_type,
            content_encoding,
        })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: PutOptions,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(options.content_type_for(key))
            .set_content_encoding(options.content_encoding)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        // DeleteObject succeeds for absent keys, so existence is checked first.
        // The two calls are not atomic.
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => {}
            Err(SdkError::ServiceError(error)) if error.err().is_not_found() => {
                return Err(self.missing_object(bucket, key).await);
            }
            Err(err) => return Err(provider_error(err)),
        }

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn list(&self, bucket: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(provider_error)?;

        if response.is_truncated().unwrap_or(false) {
            tracing::warn!(
                "Listing of bucket {bucket} is truncated at {} objects",
                response.contents().len()
            );
        }

        Ok(response
            .contents()
            .iter()
            .filter_map(entry_from_object)
            .collect())
    }
}
