//! End-to-end adapter tests against throwaway in-process HTTP servers.
//!
//! Each test binds an axum router to an ephemeral port on 127.0.0.1, points
//! a profile at it, and asserts on the classified outcome. No external
//! service is involved, so these run everywhere.

use axum::extract::{Json, Multipart};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use ocr2md::{
    convert, test_connection, BackendProfile, FailureKind, OcrError, SourceDocument,
};
use serde_json::{json, Value};
use std::net::SocketAddr;

/// Spawn a router on an ephemeral port and return its base URL.
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn chat_success(content: &str) -> Value {
    json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
}

fn png_doc(bytes: &[u8]) -> SourceDocument<'_> {
    SourceDocument::new(bytes, "scan.png", "image/png")
}

// ── Chat backend ─────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_backend_returns_markdown_verbatim() {
    let app = Router::new().route(
        "/chat/completions",
        post(|| async { Json(chat_success("Hello World")) }),
    );
    let base = spawn_server(app).await;
    let profile = BackendProfile::local_chat(base);

    let extraction = convert(&png_doc(b"\x89PNG"), &profile)
        .await
        .expect("conversion succeeds");
    assert_eq!(extraction.markdown, "Hello World");
    assert_eq!(extraction.model_label, "local-chat");
}

#[tokio::test]
async fn chat_backend_sends_vision_payload_with_data_uri() {
    // The handler inspects the request and echoes its findings back as the
    // extracted content, so the assertion happens client-side.
    let app = Router::new().route(
        "/chat/completions",
        post(|Json(body): Json<Value>| async move {
            let model = body["model"].as_str().unwrap_or("").to_string();
            let parts = &body["messages"][0]["content"];
            let has_image = parts
                .as_array()
                .map(|a| {
                    a.iter().any(|p| {
                        p["type"] == "image_url"
                            && p["image_url"]["url"]
                                .as_str()
                                .is_some_and(|u| u.starts_with("data:image/png;base64,"))
                    })
                })
                .unwrap_or(false);
            let has_text = parts
                .as_array()
                .map(|a| a.iter().any(|p| p["type"] == "text"))
                .unwrap_or(false);
            let max_tokens = body["max_tokens"].as_u64().unwrap_or(0);
            Json(chat_success(&format!(
                "model={model};image={has_image};text={has_text};max_tokens={max_tokens}"
            )))
        }),
    );
    let base = spawn_server(app).await;
    let profile = BackendProfile::local_chat(base);

    let extraction = convert(&png_doc(b"\x89PNG\r\n"), &profile)
        .await
        .expect("conversion succeeds");
    assert_eq!(
        extraction.markdown,
        "model=llava;image=true;text=true;max_tokens=4096"
    );
}

#[tokio::test]
async fn http_500_with_plain_text_body() {
    let app = Router::new().route(
        "/chat/completions",
        post(|| async {
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
            )
        }),
    );
    let base = spawn_server(app).await;
    let profile = BackendProfile::local_chat(base);

    let err = convert(&png_doc(b"x"), &profile).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Http);
    let msg = err.to_string();
    assert!(msg.contains("500"), "got: {msg}");
    assert!(msg.contains("Internal Server Error"), "got: {msg}");
}

#[tokio::test]
async fn non_json_200_is_malformed_response() {
    let app = Router::new().route(
        "/chat/completions",
        post(|| async { "<html><body>gateway splash page</body></html>" }),
    );
    let base = spawn_server(app).await;
    let profile = BackendProfile::local_chat(base);

    let err = convert(&png_doc(b"x"), &profile).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::MalformedResponse);
    assert!(err.to_string().contains("gateway splash page"));
}

#[tokio::test]
async fn empty_content_is_empty_result_failure() {
    let app = Router::new().route(
        "/chat/completions",
        post(|| async { Json(chat_success("")) }),
    );
    let base = spawn_server(app).await;
    let profile = BackendProfile::local_chat(base);

    let err = convert(&png_doc(b"x"), &profile).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::EmptyResult);
    assert_eq!(err.to_string(), "No text extracted");
}

// ── Cloud layout-parsing backend ─────────────────────────────────────────

/// Cloud preset pointed at the local test server.
fn cloud_profile(base: String) -> BackendProfile {
    let mut profile = BackendProfile::cloud("sk-test-key");
    profile.base_url = base;
    profile
}

#[tokio::test]
async fn layout_backend_success_extracts_md_result() {
    let app = Router::new().route(
        "/api/paas/v4/layout_parsing",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            assert_eq!(auth, "Bearer sk-test-key");
            assert_eq!(body["model"], "glm-4v-flash");
            assert!(body["file"]
                .as_str()
                .is_some_and(|f| f.starts_with("data:image/png;base64,")));
            Json(json!({
                "code": 0,
                "msg": "ok",
                "data": { "md_result": "# Scanned Page\n\ncontent" }
            }))
        }),
    );
    let base = spawn_server(app).await;

    let extraction = convert(&png_doc(b"\x89PNG"), &cloud_profile(base))
        .await
        .expect("conversion succeeds");
    assert_eq!(extraction.markdown, "# Scanned Page\n\ncontent");
    assert_eq!(extraction.model_label, "cloud");
}

#[tokio::test]
async fn layout_backend_quota_error_in_200_envelope() {
    let app = Router::new().route(
        "/api/paas/v4/layout_parsing",
        post(|| async { Json(json!({ "code": 1, "msg": "quota exceeded" })) }),
    );
    let base = spawn_server(app).await;

    let err = convert(&png_doc(b"x"), &cloud_profile(base))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Backend);
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn cloud_without_key_fails_before_any_request() {
    let mut profile = BackendProfile::cloud("");
    // Unroutable address: reaching the network at all would fail the test
    // differently than the expected Config error.
    profile.base_url = "http://127.0.0.1:9".to_string();

    let err = convert(&png_doc(b"x"), &profile).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Config);
    assert!(matches!(err, OcrError::Config { .. }));
}

// ── Multipart backend ────────────────────────────────────────────────────

#[tokio::test]
async fn multipart_backend_uploads_file_and_prompt() {
    let payload: Vec<u8> = (0u16..=255).map(|b| b as u8).collect();
    let expected_len = payload.len();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, mut multipart: Multipart| async move {
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            assert!(content_type.starts_with("multipart/form-data; boundary=ocr2md-"));

            let mut file_len = 0usize;
            let mut file_name = String::new();
            let mut prompt_seen = false;
            let mut part_count = 0usize;
            while let Some(field) = multipart.next_field().await.expect("well-formed body") {
                part_count += 1;
                match field.name() {
                    Some("file") => {
                        file_name = field.file_name().unwrap_or("").to_string();
                        file_len = field.bytes().await.expect("file bytes").len();
                    }
                    Some("prompt") => {
                        let text = field.text().await.expect("prompt text");
                        prompt_seen = !text.is_empty();
                    }
                    other => panic!("unexpected multipart field: {other:?}"),
                }
            }
            Json(chat_success(&format!(
                "parts={part_count};file={file_name};len={file_len};prompt={prompt_seen}"
            )))
        }),
    );
    let base = spawn_server(app).await;
    let profile = BackendProfile::local_multipart(base);

    let doc = SourceDocument::new(&payload, "invoice.pdf", "application/pdf");
    let extraction = convert(&doc, &profile).await.expect("conversion succeeds");
    assert_eq!(
        extraction.markdown,
        format!("parts=2;file=invoice.pdf;len={expected_len};prompt=true")
    );
}

// ── Connection tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn connection_test_passes_on_health_path() {
    let app = Router::new().route("/v1/models", get(|| async { Json(json!({"data": []})) }));
    let base = spawn_server(app).await;
    let profile = BackendProfile::local_chat(base.clone());

    let report = test_connection(&profile).await;
    assert!(report.ok, "detail: {}", report.detail);
    assert!(report.detail.contains("/v1/models"));
}

#[tokio::test]
async fn connection_test_falls_back_to_root() {
    // No /v1/models route; only the bare root answers.
    let app = Router::new().route("/", get(|| async { "ok" }));
    let base = spawn_server(app).await;
    let profile = BackendProfile::local_chat(base.clone());

    let report = test_connection(&profile).await;
    assert!(report.ok, "detail: {}", report.detail);
    assert!(report.detail.contains(&format!("{base}/")));
}

#[tokio::test]
async fn connection_test_reports_unreachable_server() {
    // Bind a listener to reserve a port, then drop it so nothing answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let profile = BackendProfile::local_chat(format!("http://{addr}"));
    let report = test_connection(&profile).await;
    assert!(!report.ok);
    assert!(!report.detail.is_empty());
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let profile = BackendProfile::local_chat(format!("http://{addr}"));
    let err = convert(&png_doc(b"x"), &profile).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
}
