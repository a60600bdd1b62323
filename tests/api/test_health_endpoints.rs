// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health and GET /test through the router

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use image::RgbImage;
use paddle_ocr_gateway::{
    api::{create_app, AppState},
    vision::engine::{EngineError, EngineHandle, OcrEngine},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

struct IdleEngine;

#[async_trait]
impl OcrEngine for IdleEngine {
    fn name(&self) -> &'static str {
        "idle"
    }

    async fn recognize(&self, _image: &RgbImage) -> Result<Value, EngineError> {
        Ok(json!([]))
    }
}

fn app(ready: bool) -> Router {
    let engine = ready.then(|| EngineHandle::new(Arc::new(IdleEngine), false));
    create_app(Arc::new(AppState::new(engine, 1024 * 1024)))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_reports_engine_ready() {
    let (status, body) = get_json(app(true), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "paddle_ocr_ready": true}));
}

#[tokio::test]
async fn test_health_without_engine_is_still_ok() {
    let (status, body) = get_json(app(false), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "paddle_ocr_ready": false}));
}

#[tokio::test]
async fn test_test_endpoint() {
    let (status, body) = get_json(app(true), "/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "PaddleOCR 服务运行正常", "paddle_ocr_ready": true})
    );
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/ocr")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app(true).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder()
        .uri("/v1/ocr")
        .body(Body::empty())
        .unwrap();
    let response = app(true).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
