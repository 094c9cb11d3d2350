// PathManager maps (bucket, key) pairs onto the local directory layout used
// by the filesystem driver.
//
// The path layout under the storage root is roughly as follows:
//
//	<root>
//	└── <bucket>
//	    ├── objects
//	    │   └── <first two hex chars of sha256(key)>
//	    │       └── <hex sha256(key)>
//	    │           ├── data
//	    │           └── meta
//	    └── _tmp
//	        └── <uuid>
//
// Keys are hashed so that arbitrary keys (including ones containing `/`, or
// whose segments collide with `data`/`meta`) never alias each other on disk.
// The original key is kept inside `meta`, which is what listings report.
// A bucket exists exactly when `<root>/<bucket>` is a directory.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct PathManager {
    root_path: PathBuf,
}

impl PathManager {
    pub fn new(root: impl AsRef<Path>) -> Self {
        PathManager {
            root_path: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the path to a bucket, (e.g. `<root>/<bucket>`).
    pub fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root_path.join(bucket)
    }

    /// Returns the path to the root of a bucket's objects,
    /// (e.g. `<root>/<bucket>/objects`).
    pub fn objects_path(&self, bucket: &str) -> PathBuf {
        self.bucket_path(bucket).join("objects")
    }

    /// Returns the path to a single object,
    /// (e.g. `<root>/<bucket>/objects/<first two hex chars>/<hex digest>`).
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        let digest = key_digest(key);
        self.objects_path(bucket).join(&digest[..2]).join(&digest)
    }

    /// Returns the path to the content of a single object,
    /// (e.g. `<root>/<bucket>/objects/<..>/<hex digest>/data`).
    pub fn object_data_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.object_path(bucket, key).join("data")
    }

    /// Returns the path to the metadata of a single object,
    /// (e.g. `<root>/<bucket>/objects/<..>/<hex digest>/meta`).
    pub fn object_meta_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.object_path(bucket, key).join("meta")
    }

    /// Returns a fresh staging path for an in-flight write,
    /// (e.g. `<root>/<bucket>/_tmp/<uuid>`).
    pub fn staging_path(&self, bucket: &str) -> PathBuf {
        self.bucket_path(bucket)
            .join("_tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

fn key_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
