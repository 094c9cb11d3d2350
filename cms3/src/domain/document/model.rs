use std::fmt;

use serde::Serialize;

/// Key used whenever a request names a bucket but no document.
pub const DEFAULT_KEY: &str = "index.html";

/// Bucket and optional key exactly as they were taken from the request path.
///
/// The optional key is resolved once, at the HTTP boundary, into a
/// [`DocumentRef`]; nothing below the dispatcher sees an absent key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    pub bucket: String,
    pub key: Option<String>,
}

impl DocumentPath {
    pub fn new(bucket: impl Into<String>, key: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.filter(|k| !k.is_empty()),
        }
    }

    /// View and Save fall back to [`DEFAULT_KEY`].
    pub fn or_default_key(self) -> DocumentRef {
        DocumentRef {
            bucket: self.bucket,
            key: self.key.unwrap_or_else(|| DEFAULT_KEY.to_string()),
        }
    }

    /// Delete never falls back: a missing key yields `None`.
    pub fn require_key(self) -> Option<DocumentRef> {
        let bucket = self.bucket;
        self.key.map(|key| DocumentRef { bucket, key })
    }
}

/// A fully specified `(bucket, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentRef {
    pub bucket: String,
    pub key: String,
}

impl DocumentRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// The document every bucket lands on, `<bucket>/index.html`.
    pub fn bucket_default(bucket: impl Into<String>) -> Self {
        Self::new(bucket, DEFAULT_KEY)
    }

    /// Canonical same-origin route that opens this document in the editor,
    /// (e.g. `/<bucket>/<key>`).
    pub fn view_url(&self) -> String {
        format!("/{}/{}", encode_path(&self.bucket), encode_path(&self.key))
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Percent-encodes every `/`-separated segment of `path` and keeps the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns the extension of the last path segment with its leading dot.
/// Dotfiles such as `.env` have no extension.
pub fn key_extension(key: &str) -> Option<&str> {
    let name = key.rsplit('/').next().unwrap_or(key);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}
