//! Document workflow: one pass per request from an [`Intent`] to an [`Outcome`].

use bytes::Bytes;

use crate::codec::{self, GZIP_ENCODING};
use crate::domain::{DocumentRef, Intent, UploadedFile};
use crate::error::AppError;
use crate::presenter;
use crate::render::EditorPage;
use crate::storage::{PutOptions, StorageError};
use crate::utils::state::AppState;
use crate::utils::validation::is_valid_key;

#[derive(Debug)]
pub enum Outcome {
    /// The editor for a document, ready for the renderer.
    Page(EditorPage),
    /// Same-origin URL to send the browser to.
    Redirect(String),
}

pub async fn handle(state: &AppState, intent: Intent) -> Result<Outcome, AppError> {
    match intent {
        Intent::View(document) => view(state, document).await,
        Intent::Save { document, content } => save(state, document, content).await,
        Intent::Delete(document) => delete(state, document).await,
        Intent::Upload { bucket, file } => upload(state, bucket, file).await,
    }
}

/// GET /<bucket>/<key>
///
/// A document that does not exist yet opens as an empty editor, which is how
/// new documents get created.
pub async fn view(state: &AppState, document: DocumentRef) -> Result<Outcome, AppError> {
    let (fetched, listing) = tokio::join!(
        state.storage.fetch(&document.bucket, &document.key),
        state.storage.list(&document.bucket),
    );

    let content = match fetched {
        Ok(object) => {
            let decoded = codec::decode(&object.body)?;
            tracing::debug!("Loaded {document} ({} bytes)", decoded.len());
            Some(String::from_utf8_lossy(&decoded).into_owned())
        }
        Err(StorageError::NotFound { .. }) => {
            tracing::warn!("{document} does not exist yet, opening an empty editor");
            None
        }
        Err(err) => return Err(err.into()),
    };

    let listing = presenter::present(&listing?, &document, &state.locator);
    Ok(Outcome::Page(EditorPage::new(document, content, listing)))
}

/// POST /<bucket>/<key>
pub async fn save(state: &AppState, document: DocumentRef, content: String) -> Result<Outcome, AppError> {
    let encoded = codec::encode(content.as_bytes())?;
    state
        .storage
        .store(
            &document.bucket,
            &document.key,
            Bytes::from(encoded),
            PutOptions::encoded(GZIP_ENCODING),
        )
        .await?;

    tracing::info!("Synced {} to {}", document.key, document.bucket);
    Ok(Outcome::Redirect(document.view_url()))
}

/// DELETE /<bucket>/<key>
pub async fn delete(state: &AppState, document: DocumentRef) -> Result<Outcome, AppError> {
    state
        .storage
        .remove(&document.bucket, &document.key)
        .await?;

    tracing::info!("Deleted {} from {}", document.key, document.bucket);
    Ok(Outcome::Redirect(
        DocumentRef::bucket_default(document.bucket).view_url(),
    ))
}

/// POST /upload/<bucket>
///
/// Uploads are stored as sent. A request without a file stores nothing.
pub async fn upload(
    state: &AppState,
    bucket: String,
    file: Option<UploadedFile>,
) -> Result<Outcome, AppError> {
    match file {
        Some(file) if !file.key().is_empty() => {
            let key = file.key();
            if !is_valid_key(key) {
                return Err(AppError::InvalidKey(key.to_string()));
            }
            let size = file.body.len();
            state
                .storage
                .store(&bucket, key, file.body.clone(), PutOptions::default())
                .await?;
            tracing::info!("Uploaded {key} ({size} bytes) to {bucket}");
        }
        _ => tracing::debug!("Upload to {bucket} carried no file"),
    }

    Ok(Outcome::Redirect(DocumentRef::bucket_default(bucket).view_url()))
}
