//! Turns a bucket listing into the entries shown next to the editor.
//!
//! Text-like documents open in the editor through a same-origin route;
//! everything else links straight to the object on the provider, where it is
//! served as a static asset.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::DocumentRef;
use crate::domain::document::model::{encode_path, key_extension};
use crate::storage::ObjectEntry;

/// Extensions whose documents are edited inline. Closed set.
pub const INLINE_EXTENSIONS: [&str; 4] = [".html", ".css", ".js", ".txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Inline,
    External,
}

impl LinkKind {
    pub fn for_key(key: &str) -> Self {
        match key_extension(key) {
            Some(ext) if INLINE_EXTENSIONS.contains(&ext) => LinkKind::Inline,
            _ => LinkKind::External,
        }
    }
}

/// Builds fully qualified URLs for objects hosted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    base_url: String,
}

impl ResourceLocator {
    /// Virtual AWS endpoint of a region, (e.g. `https://s3.eu-west-1.amazonaws.com`).
    pub fn for_region(region: &str) -> Self {
        Self::with_base_url(format!("https://s3.{region}.amazonaws.com"))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns `<base>/<bucket>/<key>`.
    pub fn resource_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, encode_path(bucket), encode_path(key))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListedDocument {
    pub name: String,
    pub url: String,
    pub kind: LinkKind,
    /// Same-origin route a delete form posts to (with `_method=delete`).
    pub delete_action: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
    /// Whether this entry is the document open in the editor.
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub bucket: String,
    pub documents: Vec<ListedDocument>,
}

/// Pure: the same listing and context always produce the same view, in the
/// listing's order.
pub fn present(listing: &[ObjectEntry], current: &DocumentRef, locator: &ResourceLocator) -> ListingView {
    let documents = listing
        .iter()
        .map(|entry| {
            let kind = LinkKind::for_key(&entry.key);
            let route = DocumentRef::new(current.bucket.as_str(), entry.key.as_str()).view_url();
            let url = match kind {
                LinkKind::Inline => route.clone(),
                LinkKind::External => locator.resource_url(&current.bucket, &entry.key),
            };
            ListedDocument {
                name: entry.key.clone(),
                url,
                kind,
                delete_action: route,
                size: entry.size,
                last_modified: entry.last_modified,
                current: entry.key == current.key,
            }
        })
        .collect();

    ListingView {
        bucket: current.bucket.clone(),
        documents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> ObjectEntry {
        ObjectEntry {
            key: key.to_string(),
            size: Some(10),
            last_modified: None,
        }
    }

    #[test]
    fn test_inline_and_external_links() {
        let locator = ResourceLocator::for_region("eu-west-1");
        let current = DocumentRef::new("bucket1", "index.html");
        let view = present(&[entry("notes.html"), entry("logo.png")], &current, &locator);

        assert_eq!(view.bucket, "bucket1");
        assert_eq!(view.documents[0].kind, LinkKind::Inline);
        assert_eq!(view.documents[0].url, "/bucket1/notes.html");
        assert_eq!(view.documents[1].kind, LinkKind::External);
        assert_eq!(view.documents[1].delete_action, "/bucket1/logo.png");
        assert_eq!(
            view.documents[1].url,
            "https://s3.eu-west-1.amazonaws.com/bucket1/logo.png"
        );
    }

    #[test]
    fn test_classification_is_closed_set() {
        for key in ["a.html", "b.css", "c.js", "d.txt", "dir/e.html"] {
            assert_eq!(LinkKind::for_key(key), LinkKind::Inline, "{key}");
        }
        for key in ["a.htm", "b.md", "c.json", "README", "e.HTML", "f.html.gz", ".txt"] {
            assert_eq!(LinkKind::for_key(key), LinkKind::External, "{key}");
        }
    }

    #[test]
    fn test_marks_current_document_and_keeps_order() {
        let locator = ResourceLocator::for_region("us-east-1");
        let current = DocumentRef::new("b1", "b.txt");
        let view = present(&[entry("c.txt"), entry("b.txt"), entry("a.txt")], &current, &locator);
        let names: Vec<_> = view.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["c.txt", "b.txt", "a.txt"]);
        let current: Vec<_> = view.documents.iter().map(|d| d.current).collect();
        assert_eq!(current, vec![false, true, false]);
    }

    #[test]
    fn test_custom_base_url_and_encoding() {
        let locator = ResourceLocator::with_base_url("http://127.0.0.1:9000/");
        let current = DocumentRef::new("b1", "index.html");
        let view = present(&[entry("img/my logo.png"), entry("my page.html")], &current, &locator);
        assert_eq!(view.documents[0].url, "http://127.0.0.1:9000/b1/img/my%20logo.png");
        assert_eq!(view.documents[1].url, "/b1/my%20page.html");
    }

    #[test]
    fn test_empty_listing() {
        let view = present(
            &[],
            &DocumentRef::bucket_default("b1"),
            &ResourceLocator::for_region("us-east-1"),
        );
        assert!(view.documents.is_empty());
    }
}
