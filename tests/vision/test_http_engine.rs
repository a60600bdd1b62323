// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sidecar client against a local fake sidecar

use axum::{http::StatusCode, routing::{get, post}, Json, Router};
use image::RgbImage;
use paddle_ocr_gateway::{
    config::EngineConfig,
    vision::engine::{EngineError, HttpOcrEngine, OcrEngine},
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::net::TcpListener;

/// Start `app` on an ephemeral port and return its base URL
async fn spawn_sidecar(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(endpoint: &str) -> HttpOcrEngine {
    HttpOcrEngine::new(endpoint, Duration::from_secs(5)).unwrap()
}

fn image() -> RgbImage {
    RgbImage::from_pixel(4, 2, image::Rgb([255, 255, 255]))
}

async fn echo_image(Json(body): Json<Value>) -> Json<Value> {
    let has_image = body["image"].as_str().map_or(false, |s| !s.is_empty());
    Json(json!({
        "rec_texts": [if has_image { "received" } else { "missing" }],
        "rec_scores": [0.9]
    }))
}

#[tokio::test]
async fn test_predict_route() {
    let base = spawn_sidecar(
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/predict", post(echo_image)),
    )
    .await;

    let raw = client(&base).recognize(&image()).await.unwrap();
    assert_eq!(raw["rec_texts"], json!(["received"]));
}

#[tokio::test]
async fn test_falls_back_to_legacy_route_once() {
    let predict_hits = Arc::new(AtomicUsize::new(0));
    let hits = predict_hits.clone();
    let base = spawn_sidecar(
        Router::new()
            .route(
                "/predict",
                post(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        StatusCode::NOT_FOUND
                    }
                }),
            )
            .route("/ocr", post(|| async { Json(json!([[[[[0, 0]], ["legacy", 0.8]]]])) })),
    )
    .await;

    let engine = client(&base);
    let first = engine.recognize(&image()).await.unwrap();
    let second = engine.recognize(&image()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0][0][1][0], "legacy");
    assert_eq!(predict_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upstream_error_status() {
    let base = spawn_sidecar(Router::new().route(
        "/predict",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    ))
    .await;

    match client(&base).recognize(&image()).await {
        Err(EngineError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "model crashed");
        }
        other => panic!("expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body() {
    let base = spawn_sidecar(Router::new().route("/predict", post(|| async { "not json" }))).await;

    let result = client(&base).recognize(&image()).await;
    assert!(matches!(result, Err(EngineError::InvalidBody(_))));
}

#[tokio::test]
async fn test_connect_waits_for_health() {
    let base = spawn_sidecar(Router::new().route("/health", get(|| async { "ok" }))).await;
    let config = EngineConfig {
        endpoint: format!("{}/", base),
        startup_retries: 1,
        ..EngineConfig::default()
    };

    let engine = HttpOcrEngine::connect(&config).await.unwrap();
    assert_eq!(engine.endpoint(), base);
}

#[tokio::test]
async fn test_connect_gives_up() {
    // Bind and drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = EngineConfig {
        endpoint: format!("http://127.0.0.1:{}", port),
        timeout_secs: 2,
        startup_retries: 2,
        startup_retry_delay_ms: 10,
        serialize_calls: true,
    };

    match HttpOcrEngine::connect(&config).await {
        Err(EngineError::NotReady { attempts, .. }) => assert_eq!(attempts, 2),
        Err(e) => panic!("expected NotReady, got {}", e),
        Ok(_) => panic!("connect should fail without a sidecar"),
    }
}
