use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::domain::{DocumentPath, DocumentRef, Intent, UploadedFile};
use crate::error::AppError;
use crate::service::document::{self, Outcome};
use crate::utils::state::AppState;
use crate::utils::validation::{is_valid_bucket, is_valid_key};

/// Field of the upload form carrying the file.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
struct SaveForm {
    #[serde(default)]
    content: String,
}

/// Every document route goes through here. The tail is matched by hand since
/// keys may contain `/`.
pub async fn dispatch_handler(
    State(state): State<Arc<AppState>>,
    Path(tail): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let method = request.method().clone();
    let segments: Vec<&str> = tail.split('/').collect();

    let intent = match segments.as_slice() {
        // tail: /upload/{bucket}
        ["upload", bucket] if method == Method::POST => {
            let bucket = checked_bucket(bucket)?;
            let file = read_upload(&state, request).await?;
            Intent::Upload { bucket, file }
        }
        // tail: /{bucket}/{key?}
        [bucket, key @ ..] => {
            let bucket = checked_bucket(bucket)?;
            let key = key.join("/");
            let path = DocumentPath::new(bucket, Some(key));
            if let Some(key) = &path.key {
                if !is_valid_key(key) {
                    return Err(AppError::InvalidKey(key.clone()));
                }
            }

            match method {
                Method::GET | Method::HEAD => Intent::View(path.or_default_key()),
                Method::POST => {
                    let form = read_save_form(&state, request).await?;
                    Intent::Save {
                        document: path.or_default_key(),
                        content: form.content,
                    }
                }
                // Delete never falls back to the default document.
                Method::DELETE => {
                    let bucket = path.bucket.clone();
                    Intent::Delete(path.require_key().ok_or(AppError::KeyRequired(bucket))?)
                }
                _ => return Ok(not_found().await.into_response()),
            }
        }
        _ => return Ok(not_found().await.into_response()),
    };

    match document::handle(&state, intent).await? {
        Outcome::Page(page) => Ok(Html(state.renderer.render(&page)?).into_response()),
        Outcome::Redirect(location) => Ok(found(location)),
    }
}

/// GET /
pub async fn home_handler(State(state): State<Arc<AppState>>) -> Response {
    found(DocumentRef::bucket_default(state.config.default_bucket.as_str()).view_url())
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404")
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

fn checked_bucket(bucket: &str) -> Result<String, AppError> {
    if is_valid_bucket(bucket) {
        Ok(bucket.to_string())
    } else {
        Err(AppError::InvalidBucket(bucket.to_string()))
    }
}

/// A body sent without any content type is a missing `content` field, saved
/// as empty text. Bodies declared as something else than a form are refused.
async fn read_save_form(state: &Arc<AppState>, request: Request) -> Result<SaveForm, AppError> {
    let typed = request.headers().contains_key(CONTENT_TYPE);
    match Form::<SaveForm>::from_request(request, state).await {
        Ok(Form(form)) => Ok(form),
        Err(FormRejection::InvalidFormContentType(_)) if !typed => Ok(SaveForm::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Pulls the `file` field out of a multipart body. A field without a file name
/// is what browsers send when nothing was picked.
async fn read_upload(
    state: &Arc<AppState>,
    request: Request,
) -> Result<Option<UploadedFile>, AppError> {
    let mut multipart = Multipart::from_request(request, state).await?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let body = field.bytes().await?;
        if file_name.is_empty() {
            return Ok(None);
        }
        return Ok(Some(UploadedFile { file_name, body }));
    }
    Ok(None)
}
