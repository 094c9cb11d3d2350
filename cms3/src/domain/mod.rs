pub mod document;

pub use document::{DEFAULT_KEY, DocumentPath, DocumentRef, Intent, UploadedFile};
