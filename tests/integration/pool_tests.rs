//! Rendering pool integration tests.
//!
//! Tests verify:
//! - Concurrent conversions never exceed the pool's instance limit
//! - Released instances beyond max_idle are closed
//! - Acquisition timeouts, closed pools and engine start failures return 500
//! - Instances are handed back on every path

use std::time::Duration;

use axum::http::StatusCode;
use tower::ServiceExt;

use pdf_converter::{InstancePool, PoolConfig, PoolError};

use super::test_utils::{decoded_pages, fake_pdf, read_json, upload, FakeFactory, TestApp};

fn small_pool(max_total: usize, max_idle: usize) -> PoolConfig {
    PoolConfig::default()
        .with_min_idle(0)
        .with_max_idle(max_idle)
        .with_max_total(max_total)
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_conversions_respect_max_total() {
    let factory = FakeFactory::new().with_render_delay(Duration::from_millis(20));
    let app = TestApp::with(factory, small_pool(2, 2));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            let response = router.oneshot(upload("doc.pdf", &fake_pdf(2))).await.unwrap();
            read_json(response).await
        }));
    }

    for handle in handles {
        let (status, json) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decoded_pages(&json).len(), 2);
    }

    assert!(app.stats.max_open_at_once() <= 2);
    assert!(app.stats.instances_created() <= 2);
    assert_eq!(app.stats.documents_opened(), 8);
    assert_eq!(app.stats.documents_closed(), 8);
    assert_eq!(app.pool.stats().in_use, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_surplus_instances_are_closed_on_release() {
    let factory = FakeFactory::new().with_render_delay(Duration::from_millis(20));
    let app = TestApp::with(factory, small_pool(4, 1));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            router.oneshot(upload("doc.pdf", &fake_pdf(1))).await.unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().status(), StatusCode::OK);
    }

    let stats = app.pool.stats();
    assert_eq!(stats.in_use, 0);
    assert!(stats.idle <= 1);
    assert_eq!(
        app.stats.instances_closed(),
        app.stats.instances_created() - stats.idle
    );
}

#[tokio::test]
async fn test_sequential_conversions_reuse_one_instance() {
    let app = TestApp::new();

    for _ in 0..5 {
        let response = app
            .router
            .clone()
            .oneshot(upload("doc.pdf", &fake_pdf(1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.stats.instances_created(), 1);
    assert_eq!(app.stats.instances_closed(), 0);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_acquire_timeout_returns_500() {
    let config = small_pool(1, 1).with_acquire_timeout(Duration::from_millis(50));
    let app = TestApp::with(FakeFactory::new(), config);

    let lease = app.pool.acquire().await.unwrap();

    let response = app
        .router
        .clone()
        .oneshot(upload("doc.pdf", &fake_pdf(1)))
        .await
        .unwrap();
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = json["message"].as_str().unwrap();
    assert!(
        message.starts_with("Failed to convert PDF: failed to get PDFium instance: Timed out"),
        "unexpected message: {}",
        message
    );
    assert!(json["data"].is_null());

    // Once the instance is back, requests go through again
    drop(lease);
    let response = app
        .router
        .oneshot(upload("doc.pdf", &fake_pdf(1)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_closed_pool_returns_500() {
    let app = TestApp::new();
    app.pool.close();

    let response = app
        .router
        .oneshot(upload("doc.pdf", &fake_pdf(1)))
        .await
        .unwrap();
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json["message"],
        "Failed to convert PDF: failed to get PDFium instance: Rendering pool is closed"
    );
    assert_eq!(app.stats.instances_closed(), 1);
}

#[tokio::test]
async fn test_closed_pool_still_serves_images() {
    let app = TestApp::new();
    app.pool.close();

    let response = app
        .router
        .oneshot(upload("photo.png", b"not really a png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_engine_start_failure_returns_500() {
    let app = TestApp::with(FakeFactory::new().failing(), small_pool(2, 2));

    let response = app
        .router
        .oneshot(upload("doc.pdf", &fake_pdf(1)))
        .await
        .unwrap();
    let (status, json) = read_json(response).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json["message"],
        "Failed to convert PDF: failed to get PDFium instance: \
         Failed to create rendering instance: Engine unavailable: library not loaded"
    );
    assert_eq!(app.pool.stats().in_use, 0);
}

#[tokio::test]
async fn test_warm_up_failure_fails_pool_creation() {
    let result = InstancePool::new(FakeFactory::new().failing(), PoolConfig::default());
    assert!(matches!(result, Err(PoolError::Create(_))));
}
