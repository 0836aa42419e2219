//! Authentication integration tests.
//!
//! Tests verify:
//! - Missing and invalid API keys are rejected with 401
//! - Rejected requests never reach the rendering engine
//! - The health endpoint stays public
//! - Unknown API paths are 404, not 401

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use tower::ServiceExt;

use pdf_converter::{PoolConfig, RouterConfig};

use super::test_utils::{
    convert_request, decoded_pages, fake_pdf, file_body, read_json, FakeFactory, TestApp,
    TEST_API_KEY,
};

#[tokio::test]
async fn test_valid_key_succeeds() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(convert_request(
            Some(TEST_API_KEY),
            file_body("doc.pdf", &fake_pdf(3)),
        ))
        .await
        .unwrap();
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decoded_pages(&json).len(), 3);
}

#[tokio::test]
async fn test_missing_key() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(convert_request(None, file_body("doc.pdf", &fake_pdf(3))))
        .await
        .unwrap();
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "API key is required");
    assert!(json["data"].is_null());
    assert_eq!(app.stats.documents_opened(), 0);
}

#[tokio::test]
async fn test_empty_key_is_missing() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(convert_request(Some(""), file_body("doc.pdf", &fake_pdf(1))))
        .await
        .unwrap();
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "API key is required");
}

#[tokio::test]
async fn test_wrong_key() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(convert_request(
            Some("not-the-key"),
            file_body("doc.pdf", &fake_pdf(3)),
        ))
        .await
        .unwrap();
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid API key");
    assert!(json["data"].is_null());
    assert_eq!(app.stats.documents_opened(), 0);
}

#[tokio::test]
async fn test_key_comparison_is_exact() {
    let app = TestApp::new();

    for key in [
        "TEST-API-KEY",
        "test-api-key ",
        "test-api-ke",
        "test-api-key-and-more",
    ] {
        let response = app
            .router
            .clone()
            .oneshot(convert_request(Some(key), file_body("doc.pdf", &fake_pdf(1))))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "key {:?} should be rejected",
            key
        );
    }
}

#[tokio::test]
async fn test_non_ascii_key_matches_exact_bytes() {
    let key = "clé-secrète";
    let app = TestApp::with_router_config(
        FakeFactory::new(),
        PoolConfig::default(),
        RouterConfig::new(key).with_tracing(false),
    );

    let mut request = convert_request(None, file_body("doc.pdf", &fake_pdf(2)));
    request.headers_mut().insert(
        "x-api-key",
        HeaderValue::from_bytes(key.as_bytes()).unwrap(),
    );

    let response = app.router.clone().oneshot(request).await.unwrap();
    let (status, json) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decoded_pages(&json).len(), 2);

    // Same text with the accents stripped is a different key
    let mut request = convert_request(None, file_body("doc.pdf", &fake_pdf(2)));
    request.headers_mut().insert(
        "x-api-key",
        HeaderValue::from_bytes(b"cle-secrete").unwrap(),
    );

    let response = app.router.oneshot(request).await.unwrap();
    let (status, json) = read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid API key");
}

#[tokio::test]
async fn test_repeated_bad_keys_stay_rejected() {
    let app = TestApp::new();

    for _ in 0..5 {
        let response = app
            .router
            .clone()
            .oneshot(convert_request(
                Some("guess"),
                file_body("doc.pdf", &fake_pdf(1)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // A correct key still works afterwards
    let response = app
        .router
        .clone()
        .oneshot(convert_request(
            Some(TEST_API_KEY),
            file_body("doc.pdf", &fake_pdf(1)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.stats.documents_opened(), 1);
}

#[tokio::test]
async fn test_auth_checked_before_validation() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(convert_request(None, file_body("notes.txt", b"hello")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_api_path_is_not_found() {
    let app = TestApp::new();

    for key in [None, Some(TEST_API_KEY)] {
        let mut request = Request::builder().method("POST").uri("/api/unknown");
        if let Some(key) = key {
            request = request.header("x-api-key", key);
        }

        let response = app
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "key {:?}", key);
    }
}
