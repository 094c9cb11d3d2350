use std::collections::{BTreeMap, HashMap};

use crate::storage::{ObjectEntry, PutOptions, Storage, StorageError, StoredObject};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct MemoryObject {
    body: Bytes,
    content_type: String,
    content_encoding: Option<String>,
    last_modified: DateTime<Utc>,
}

/// In-process object store for tests and local demos. Buckets are declared
/// up front; objects of a bucket are kept ordered by key.
#[derive(Default)]
pub struct MemoryStorage {
    buckets: RwLock<HashMap<String, BTreeMap<String, MemoryObject>>>,
}

impl MemoryStorage {
    pub fn new<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemoryStorage {
            buckets: RwLock::new(
                buckets
                    .into_iter()
                    .map(|bucket| (bucket.into(), BTreeMap::new()))
                    .collect(),
            ),
        }
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::no_such_bucket(bucket))?;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::not_found(bucket, key))?;
        Ok(StoredObject {
            body: object.body.clone(),
            content_type: Some(object.content_type.clone()),
            content_encoding: object.content_encoding.clone(),
        })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: PutOptions,
    ) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::no_such_bucket(bucket))?;
        objects.insert(
            key.to_string(),
            MemoryObject {
                body,
                content_type: options.content_type_for(key),
                content_encoding: options.content_encoding,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::no_such_bucket(bucket))?;
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    async fn list(&self, bucket: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::no_such_bucket(bucket))?;
        Ok(objects
            .iter()
            .map(|(key, object)| ObjectEntry {
                key: key.clone(),
                size: Some(object.body.len() as u64),
                last_modified: Some(object.last_modified),
            })
            .collect())
    }
}
