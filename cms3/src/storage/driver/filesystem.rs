use std::path::Path;

use crate::storage::paths::PathManager;
use crate::storage::{ObjectEntry, PutOptions, Storage, StorageError, StoredObject};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{
    fs::{self, create_dir_all, read_dir, remove_dir_all, rename},
    io::{self, AsyncWriteExt},
};

/// Sidecar written next to each object's data.
#[derive(Debug, Serialize, Deserialize)]
struct ObjectMeta {
    key: String,
    content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_encoding: Option<String>,
}

/// Object store backed by a local directory. Every bucket is a directory
/// directly under the root and must be created out of band.
pub struct FilesystemStorage {
    path_manager: PathManager,
}

impl FilesystemStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        FilesystemStorage {
            path_manager: PathManager::new(root),
        }
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        if bucket.is_empty() || bucket == "." || bucket == ".." || bucket.contains('/') {
            return Err(StorageError::no_such_bucket(bucket));
        }
        match fs::metadata(self.path_manager.bucket_path(bucket)).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::no_such_bucket(bucket)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::no_such_bucket(bucket))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Writes `contents` to a staging file and renames it over `target`, so
    /// readers observe either the old or the new file.
    async fn write_replace(&self, bucket: &str, target: &Path, contents: &[u8]) -> io::Result<()> {
        let staging = self.path_manager.staging_path(bucket);
        if let Some(parent) = staging.parent() {
            create_dir_all(parent).await?;
        }
        if let Some(parent) = target.parent() {
            create_dir_all(parent).await?;
        }

        let written = async {
            let mut file = fs::File::create(&staging).await?;
            file.write_all(contents).await?;
            file.flush().await?;
            drop(file);
            rename(&staging, target).await
        }
        .await;

        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&staging).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove staging file {}: {cleanup}", staging.display());
                }
            }
            return Err(err);
        }
        Ok(())
    }

    async fn read_entry(&self, object_dir: &Path) -> io::Result<Option<ObjectEntry>> {
        let meta = match fs::read(object_dir.join("meta")).await {
            Ok(raw) => raw,
            // a concurrent remove, or a write that has not published its meta yet
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        let meta: ObjectMeta = serde_json::from_slice(&meta)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        let (size, last_modified) = match fs::metadata(object_dir.join("data")).await {
            Ok(data) => (
                Some(data.len()),
                data.modified().ok().map(DateTime::<Utc>::from),
            ),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        Ok(Some(ObjectEntry {
            key: meta.key,
            size,
            last_modified,
        }))
    }
}

#[async_trait::async_trait]
impl Storage for FilesystemStorage {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        self.ensure_bucket(bucket).await?;

        let body = match fs::read(self.path_manager.object_data_path(bucket, key)).await {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::not_found(bucket, key));
            }
            Err(err) => return Err(err.into()),
        };
        let meta = match fs::read(self.path_manager.object_meta_path(bucket, key)).await {
            Ok(raw) => serde_json::from_slice::<ObjectMeta>(&raw).ok(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };

        Ok(StoredObject {
            body: Bytes::from(body),
            content_type: meta.as_ref().map(|m| m.content_type.clone()),
            content_encoding: meta.and_then(|m| m.content_encoding),
        })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: PutOptions,
    ) -> Result<(), StorageError> {
        self.ensure_bucket(bucket).await?;

        let meta = ObjectMeta {
            key: key.to_string(),
            content_type: options.content_type_for(key),
            content_encoding: options.content_encoding,
        };
        let meta = serde_json::to_vec(&meta)
            .map_err(|err| StorageError::provider(None, err.to_string()))?;

        // data first: an object becomes visible to listings once its meta exists
        self.write_replace(bucket, &self.path_manager.object_data_path(bucket, key), &body)
            .await?;
        self.write_replace(bucket, &self.path_manager.object_meta_path(bucket, key), &meta)
            .await?;
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.ensure_bucket(bucket).await?;

        match remove_dir_all(self.path_manager.object_path(bucket, key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::not_found(bucket, key))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self, bucket: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        self.ensure_bucket(bucket).await?;

        let mut entries = vec![];
        let mut shards = match read_dir(self.path_manager.objects_path(bucket)).await {
            Ok(shards) => shards,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(entries),
            Err(err) => return Err(err.into()),
        };
        while let Some(shard) = shards.next_entry().await? {
            if !shard.file_type().await?.is_dir() {
                continue;
            }
            let mut objects = read_dir(shard.path()).await?;
            while let Some(object) = objects.next_entry().await? {
                if let Some(entry) = self.read_entry(&object.path()).await? {
                    entries.push(entry);
                }
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
