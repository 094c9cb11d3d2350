use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use cms3::api::{create_router, MAX_BODY_BYTES};
use cms3::codec;
use cms3::config::Config;
use cms3::storage::driver::memory::MemoryStorage;
use cms3::storage::{Storage, StorageError};
use cms3::utils::cli::StorageKind;
use cms3::utils::state::AppState;

const BOUNDARY: &str = "----cms3-test-boundary";

fn app() -> (Router, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new(["b1"]));
    let config = Config {
        host: "127.0.0.1".into(),
        port: 3012,
        storage_typ: StorageKind::Memory,
        root_dir: String::new(),
        default_bucket: "b1".into(),
        region: "eu-west-1".into(),
        endpoint_url: None,
        public_base_url: None,
    };
    let state = AppState::with_storage(config, storage.clone()).unwrap();
    (create_router(Arc::new(state)), storage)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_upload(uri: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_missing_document_opens_empty_editor() {
    let (app, _storage) = app();
    let response = app.oneshot(get("/b1/new.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/b1/new.html""#));
    assert!(html.contains(r#"placeholder="TYPE STUFF"></textarea>"#));
}

#[tokio::test]
async fn test_save_then_view() {
    let (app, storage) = app();
    let response = app
        .clone()
        .oneshot(post_form("/b1/a.html", "content=%3Cp%3Ehi%3C%2Fp%3E"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/b1/a.html");

    let object = storage.fetch("b1", "a.html").await.unwrap();
    assert_eq!(object.content_encoding.as_deref(), Some("gzip"));
    assert_eq!(codec::decode(&object.body).unwrap(), b"<p>hi</p>");

    let response = app.oneshot(get("/b1/a.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("&lt;p&gt;hi&lt;"));
    assert!(!html.contains("<p>hi</p>"));
    assert!(html.contains(r#"href="/b1/a.html""#));
}

#[tokio::test]
async fn test_save_without_content_stores_empty_text() {
    let (app, storage) = app();
    let response = app.oneshot(post_form("/b1/empty.txt", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    let object = storage.fetch("b1", "empty.txt").await.unwrap();
    assert!(codec::decode(&object.body).unwrap().is_empty());
}

#[tokio::test]
async fn test_bucket_without_key_uses_default_document() {
    let (app, storage) = app();
    let response = app
        .clone()
        .oneshot(post_form("/b1", "content=home"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/b1/index.html");
    assert!(storage.fetch("b1", "index.html").await.is_ok());

    for uri in ["/b1", "/b1/"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(">home</textarea>"));
    }
}

#[tokio::test]
async fn test_nested_keys_round_trip() {
    let (app, storage) = app();
    let response = app
        .clone()
        .oneshot(post_form("/b1/css/site.css", "content=body%7B%7D"))
        .await
        .unwrap();
    assert_eq!(location(&response), "/b1/css/site.css");
    assert!(storage.fetch("b1", "css/site.css").await.is_ok());

    let response = app.oneshot(get("/b1/css/site.css")).await.unwrap();
    assert!(body_text(response).await.contains(">body{}</textarea>"));
}

#[tokio::test]
async fn test_method_override_deletes() {
    let (app, storage) = app();
    app.clone()
        .oneshot(post_form("/b1/a.html", "content=x"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_form("/b1/a.html", "_method=DELETE"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/b1/index.html");

    assert!(matches!(
        storage.fetch("b1", "a.html").await,
        Err(StorageError::NotFound { .. })
    ));
    assert!(storage.list("b1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_override_saves_without_storing_the_field() {
    let (app, storage) = app();
    let response = app
        .oneshot(post_form("/b1/a.txt", "_method=put&content=kept"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    let object = storage.fetch("b1", "a.txt").await.unwrap();
    assert_eq!(codec::decode(&object.body).unwrap(), b"kept");
}

#[tokio::test]
async fn test_encoded_method_field_deletes() {
    let (app, storage) = app();
    app.clone()
        .oneshot(post_form("/b1/a.html", "content=x"))
        .await
        .unwrap();

    let response = app
        .oneshot(post_form("/b1/a.html", "%5Fmethod=delete"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/b1/index.html");
    assert!(matches!(
        storage.fetch("b1", "a.html").await,
        Err(StorageError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_post_without_body_saves_empty_text() {
    let (app, storage) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/b1/x.txt")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/b1/x.txt");
    let object = storage.fetch("b1", "x.txt").await.unwrap();
    assert!(codec::decode(&object.body).unwrap().is_empty());
}

#[tokio::test]
async fn test_post_with_other_content_type_is_refused() {
    let (app, storage) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/b1/x.txt")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"content":"x"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(storage.list("b1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_form_is_payload_too_large() {
    let (app, storage) = app();
    let body = format!("content={}", "a".repeat(MAX_BODY_BYTES));
    let response = app.oneshot(post_form("/b1/big.txt", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(storage.list("b1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_verb() {
    let (app, storage) = app();
    app.clone()
        .oneshot(post_form("/b1/a.html", "content=x"))
        .await
        .unwrap();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/b1/a.html")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(storage.list("b1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_requires_key() {
    let (app, _storage) = app();
    let response = app.oneshot(post_form("/b1", "_method=delete")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_missing_document_is_404() {
    let (app, _storage) = app();
    let response = app
        .oneshot(post_form("/b1/ghost.html", "_method=delete"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "no such object: b1/ghost.html");
}

#[tokio::test]
async fn test_invalid_key_is_rejected() {
    let (app, _storage) = app();
    let response = app
        .oneshot(post_form("/b1/a//b.html", "content=x"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_stores_raw_file() {
    let (app, storage) = app();
    let response = app
        .clone()
        .oneshot(post_upload("/upload/b1", "logo.png", b"\x89PNG\r\n\x1a\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/b1/index.html");

    let object = storage.fetch("b1", "logo.png").await.unwrap();
    assert_eq!(&object.body[..], b"\x89PNG\r\n\x1a\n");
    assert_eq!(object.content_type.as_deref(), Some("image/png"));
    assert_eq!(object.content_encoding, None);

    let response = app.oneshot(get("/b1/index.html")).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains(r#"href="https://s3.eu-west-1.amazonaws.com/b1/logo.png""#));
}

#[tokio::test]
async fn test_upload_without_file_still_redirects() {
    let (app, storage) = app();
    let response = app
        .oneshot(post_upload("/upload/b1", "", b""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(storage.list("b1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_home_redirects_to_default_bucket() {
    let (app, _storage) = app();
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/b1/index.html");
}

#[tokio::test]
async fn test_unsupported_method_is_404() {
    let (app, _storage) = app();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/b1/a.html")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "404");
}

#[tokio::test]
async fn test_unknown_bucket_surfaces_provider_status() {
    let (app, _storage) = app();
    let response = app.oneshot(get("/nope/a.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert!(body_text(response).await.starts_with("NoSuchBucket"));
}
