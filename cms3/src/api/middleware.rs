use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Request};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::IntoResponse;
use serde_urlencoded::{from_bytes, to_string};

use crate::error::AppError;

/// Form field that lets a plain HTML form ask for another verb.
pub const METHOD_FIELD: &str = "_method";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Rewrites `POST` + `_method=delete` into `DELETE` before dispatch. The
/// field is removed from the body either way, so nothing downstream stores it.
pub async fn method_override(req: Request, next: Next) -> Result<impl IntoResponse, AppError> {
    if req.method() != Method::POST || !is_form(&req) {
        return Ok(next.run(req).await);
    }

    // Buffer with the router's body limit, which lives in the extensions.
    let (mut parts, body) = req.into_parts();
    let mut buffered = Request::new(body);
    *buffered.extensions_mut() = parts.extensions.clone();
    let body = Bytes::from_request(buffered, &()).await?;

    let (requested, rest) = take_method_field(&body)?;
    if let Some(requested) = requested {
        if requested.eq_ignore_ascii_case("delete") {
            tracing::debug!("Overriding POST {} with DELETE", parts.uri.path());
            parts.method = Method::DELETE;
        }
    }
    parts.headers.remove(CONTENT_LENGTH);

    Ok(next.run(Request::from_parts(parts, Body::from(rest))).await)
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}

/// Splits a urlencoded body into the decoded `_method` value and the
/// re-encoded remaining fields. The last `_method` pair wins.
fn take_method_field(body: &[u8]) -> Result<(Option<String>, String), AppError> {
    let pairs: Vec<(String, String)> = from_bytes(body)?;
    let mut requested = None;
    let mut kept = Vec::with_capacity(pairs.len());

    for (name, value) in pairs {
        if name == METHOD_FIELD {
            requested = Some(value);
        } else {
            kept.push((name, value));
        }
    }

    Ok((requested, to_string(&kept)?))
}
