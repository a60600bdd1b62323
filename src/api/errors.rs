// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// No OCR engine was initialized at startup
    EngineNotReady,
    /// Request body has no `image` field
    MissingImage,
    /// `image` could not be decoded as base64 or as an image
    InvalidImage(String),
    /// Engine call or anything after it failed
    ProcessingFailed(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::EngineNotReady => "PaddleOCR 未初始化".to_string(),
            ApiError::MissingImage => "缺少图片数据".to_string(),
            ApiError::InvalidImage(_) => "图片格式错误".to_string(),
            ApiError::ProcessingFailed(msg) => format!("OCR处理失败: {}", msg),
        };
        ErrorResponse { error }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::EngineNotReady | ApiError::ProcessingFailed(_) => 500,
            ApiError::MissingImage | ApiError::InvalidImage(_) => 400,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::EngineNotReady => write!(f, "OCR engine not initialized"),
            ApiError::MissingImage => write!(f, "Missing image data"),
            ApiError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ApiError::ProcessingFailed(msg) => write!(f, "OCR processing failed: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
