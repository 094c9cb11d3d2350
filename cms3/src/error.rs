use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{BytesRejection, FormRejection};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::codec::CodecError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("a document key is required to delete from bucket {0}")]
    KeyRequired(String), // Contains the bucket

    #[error("invalid document key: {0}")]
    InvalidKey(String),

    #[error("invalid bucket name: {0}")]
    InvalidBucket(String),

    #[error("invalid form body: {0}")]
    Form(#[from] FormRejection),

    #[error("invalid upload request: {0}")]
    UploadRequest(#[from] MultipartRejection),

    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("failed to read request body: {0}")]
    Body(#[from] BytesRejection),

    #[error("invalid form body: {0}")]
    FormDecode(#[from] serde_urlencoded::de::Error),

    #[error("failed to re-encode form body: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    // Storage and content errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("render error: {0}")]
    Render(#[from] minijinja::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::KeyRequired(_) | Self::InvalidKey(_) | Self::InvalidBucket(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Form(rejection) => rejection.status(),
            Self::UploadRequest(rejection) => rejection.status(),
            Self::Multipart(err) => err.status(),
            Self::Body(rejection) => rejection.status(),
            Self::FormDecode(_) => StatusCode::BAD_REQUEST,
            Self::FormEncode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(StorageError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::Provider { status, .. }) => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Codec(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("Generating response for AppError: {:?}", self);
        } else {
            tracing::warn!("Generating response for AppError: {}", self);
        }

        let mut message = self.to_string();
        if message.is_empty() {
            message = status_code
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string();
        }
        (
            status_code,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
