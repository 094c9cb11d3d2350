pub mod intent;
pub mod model;

pub use intent::{Intent, UploadedFile};
pub use model::{DEFAULT_KEY, DocumentPath, DocumentRef};
