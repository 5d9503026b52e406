//! API integration tests.
//!
//! The router is driven directly with `tower::ServiceExt::oneshot`; upstream
//! behavior is simulated with a stub server bound to an ephemeral port.
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use tower::ServiceExt;

use notion_avatar_server::api::routes::{build_router, AppState};
use notion_avatar_server::prompt::composer::PromptComposer;
use notion_avatar_server::prompt::references::ReferenceImage;
use notion_avatar_server::storage::outputs::OutputStore;
use notion_avatar_server::GeminiClient;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// A client pointed at a port nothing listens on. Any attempt to contact the
/// upstream from a test using this client fails as a network error, so a 400
/// response proves validation short-circuited before the gateway.
fn unreachable_client() -> GeminiClient {
    GeminiClient::new(
        "http://127.0.0.1:9".to_string(),
        "test-key".to_string(),
        "stub-model".to_string(),
    )
}

async fn test_app(gemini: Option<GeminiClient>, dir: &Path) -> Router {
    let references = vec![
        ReferenceImage { bytes: vec![0xAA; 16], mime_type: "image/png".to_string() },
        ReferenceImage { bytes: vec![0xBB; 16], mime_type: "image/png".to_string() },
    ];
    let state = Arc::new(AppState {
        gemini,
        composer: PromptComposer::new(references),
        outputs: OutputStore::new(dir.join("outputs")).await.unwrap(),
        public_dir: dir.to_path_buf(),
    });
    build_router(state)
}

fn multipart_request(field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            BOUNDARY, field, filename, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    Request::post("/convert")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json<B>(body: B) -> Value
where
    B: axum::body::HttpBody,
    B::Error: std::fmt::Debug,
{
    let bytes = hyper::body::to_bytes(body).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn output_count(dir: &Path) -> usize {
    std::fs::read_dir(dir.join("outputs")).unwrap().count()
}

/// Spawn a stub upstream that answers every generateContent call with the
/// given status and body, and return a client pointed at it.
async fn stub_upstream(status: StatusCode, body: Value) -> GeminiClient {
    let app = Router::new().route(
        "/v1beta/models/:model",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
    GeminiClient::new(
        format!("http://{}", addr),
        "test-key".to_string(),
        "stub-model".to_string(),
    )
}

fn image_response(bytes: &[u8]) -> Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "text": "generated" },
                    { "inlineData": {
                        "mimeType": "image/png",
                        "data": general_purpose::STANDARD.encode(bytes)
                    }}
                ]
            }
        }]
    })
}

#[tokio::test]
async fn health_reports_not_ready_without_credential() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(None, tmp.path()).await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["genai_initialized"], false);
    assert_eq!(body["api_key_configured"], false);
}

#[tokio::test]
async fn health_reports_ready_with_credential() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(Some(unreachable_client()), tmp.path()).await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["genai_initialized"], true);
    assert_eq!(body["reference_images_loaded"], 2);
}

#[tokio::test]
async fn convert_without_client_returns_initialization_error() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(None, tmp.path()).await;

    let response = app
        .oneshot(multipart_request("image", "photo.png", "image/png", &[1, 2, 3]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("not initialized"));
    assert_eq!(output_count(tmp.path()), 0);
}

#[tokio::test]
async fn convert_rejects_unsupported_extension() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(Some(unreachable_client()), tmp.path()).await;

    let response = app
        .oneshot(multipart_request("image", "file.txt", "text/plain", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid file type"));
    assert_eq!(output_count(tmp.path()), 0);
}

#[tokio::test]
async fn convert_rejects_oversized_upload() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(Some(unreachable_client()), tmp.path()).await;

    let oversized = vec![0u8; 10 * 1024 * 1024 + 1];
    let response = app
        .oneshot(multipart_request("image", "photo.png", "image/png", &oversized))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("too large"));
    assert_eq!(output_count(tmp.path()), 0);
}

#[tokio::test]
async fn convert_requires_an_image_field() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(Some(unreachable_client()), tmp.path()).await;

    let response = app
        .oneshot(multipart_request("attachment", "photo.png", "image/png", &[1, 2, 3]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("No image file uploaded"));
}

#[tokio::test]
async fn convert_persists_and_serves_generated_avatar() {
    let tmp = tempfile::tempdir().unwrap();
    let generated = b"fake png bytes from the model";
    let gemini = stub_upstream(StatusCode::OK, image_response(generated)).await;
    let app = test_app(Some(gemini), tmp.path()).await;

    let response = app
        .clone()
        .oneshot(multipart_request("image", "photo.png", "image/png", &[5; 2048]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    let file_path = body["results"][0]["filePath"].as_str().unwrap().to_string();
    assert!(file_path.starts_with("/outputs/"));
    assert_eq!(body["results"][0]["mimeType"], "image/png");
    assert_eq!(output_count(tmp.path()), 1);

    let response = app
        .oneshot(Request::get(file_path.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert_eq!(&bytes[..], generated);
}

#[tokio::test]
async fn upstream_error_leaves_no_output_file() {
    let tmp = tempfile::tempdir().unwrap();
    let gemini = stub_upstream(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "message": "internal failure" } }),
    )
    .await;
    let app = test_app(Some(gemini), tmp.path()).await;

    let response = app
        .oneshot(multipart_request("image", "photo.png", "image/png", &[1; 64]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(output_count(tmp.path()), 0);
}

#[tokio::test]
async fn quota_exhaustion_is_classified() {
    let tmp = tempfile::tempdir().unwrap();
    let gemini = stub_upstream(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "quota exceeded" } }),
    )
    .await;
    let app = test_app(Some(gemini), tmp.path()).await;

    let response = app
        .oneshot(multipart_request("image", "photo.png", "image/png", &[1; 64]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("quota"));
    assert_eq!(output_count(tmp.path()), 0);
}

#[tokio::test]
async fn imageless_upstream_response_is_classified() {
    let tmp = tempfile::tempdir().unwrap();
    let gemini = stub_upstream(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I cannot draw that" }] }
            }]
        }),
    )
    .await;
    let app = test_app(Some(gemini), tmp.path()).await;

    let response = app
        .oneshot(multipart_request("image", "photo.png", "image/png", &[1; 64]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("no image"));
    assert_eq!(output_count(tmp.path()), 0);
}

#[tokio::test]
async fn unreachable_upstream_is_a_network_error() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(Some(unreachable_client()), tmp.path()).await;

    let response = app
        .oneshot(multipart_request("image", "photo.png", "image/png", &[1; 64]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(output_count(tmp.path()), 0);
}

#[tokio::test]
async fn outputs_route_rejects_traversal() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(None, tmp.path()).await;

    // A file outside the output directory that must never be reachable.
    std::fs::write(tmp.path().join("secret.txt"), b"top secret").unwrap();

    for uri in [
        "/outputs/..%2Fsecret.txt",
        "/outputs/..%2F..%2Fetc%2Fpasswd",
        "/outputs/..",
    ] {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(
            response.status() == StatusCode::NOT_FOUND
                || response.status() == StatusCode::BAD_REQUEST,
            "expected rejection for {}, got {}",
            uri,
            response.status()
        );
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert!(!bytes.windows(10).any(|w| w == b"top secret"));
    }
}

#[tokio::test]
async fn outputs_route_returns_404_for_missing_file() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(None, tmp.path()).await;

    let response = app
        .oneshot(Request::get("/outputs/avatar_missing.png").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_serves_frontend_document() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("index.html"), "<html>avatar frontend</html>").unwrap();
    let app = test_app(None, tmp.path()).await;

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert!(std::str::from_utf8(&bytes).unwrap().contains("avatar frontend"));
}

#[tokio::test]
async fn index_missing_frontend_is_404() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_app(None, tmp.path()).await;

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
