// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Liveness endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::http_server::AppState;

pub const TEST_MESSAGE: &str = "PaddleOCR 服务运行正常";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub paddle_ocr_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResponse {
    pub message: String,
    pub paddle_ocr_ready: bool,
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        paddle_ocr_ready: state.is_engine_ready(),
    })
}

/// GET /test
pub async fn test_handler(State(state): State<Arc<AppState>>) -> Json<TestResponse> {
    Json(TestResponse {
        message: TEST_MESSAGE.to_string(),
        paddle_ocr_ready: state.is_engine_ready(),
    })
}
