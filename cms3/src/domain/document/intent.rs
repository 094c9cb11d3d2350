use bytes::Bytes;

use super::model::DocumentRef;

/// What a single request asks the editor to do, with every default already
/// resolved.
#[derive(Debug, Clone)]
pub enum Intent {
    View(DocumentRef),
    Save { document: DocumentRef, content: String },
    Delete(DocumentRef),
    Upload { bucket: String, file: Option<UploadedFile> },
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the browser; only its last component is used.
    pub file_name: String,
    pub body: Bytes,
}

impl UploadedFile {
    /// Key under which the upload is stored. Some browsers send a full
    /// client-side path, so anything before the last separator is dropped.
    pub fn key(&self) -> &str {
        self.file_name
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(&self.file_name)
    }
}
