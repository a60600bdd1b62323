// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handler

use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::request::OcrRequest;
use super::response::OcrResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::image_utils::{decode_base64_image, format_to_extension};
use crate::vision::normalizer::normalize;

/// POST /ocr - Extract text from an image
///
/// # Request
/// - `image`: Base64-encoded image data or `data:` URL (required)
///
/// # Response
/// - `text`: All recognized lines joined with newlines
/// - `confidence`: Average confidence percentage (0-100)
/// - `lines`: Number of recognized lines
/// - `details`: Each line with its confidence percentage
/// - `warning`: Present only when no text was recognized
///
/// # Errors
/// - 500: OCR engine not initialized
/// - 400: Missing `image` field
/// - 400: Image cannot be decoded
/// - 500: Engine call failed
pub async fn ocr_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<OcrResponse>, ApiError> {
    // 1. Engine must be up before anything else is looked at
    let engine = state.engine.as_ref().ok_or_else(|| {
        warn!("OCR request rejected: engine not initialized");
        ApiError::EngineNotReady
    })?;

    // 2. Parse request
    let request = OcrRequest::from_slice(&body).map_err(|e| {
        warn!("OCR request rejected: {}", e);
        e
    })?;
    info!("Processing OCR request ({} base64 chars)", request.image.len());

    // 3. Decode base64 image
    let (image, image_info) =
        decode_base64_image(&request.image, state.max_image_bytes).map_err(|e| {
            warn!("Failed to decode image: {}", e);
            ApiError::InvalidImage(e.to_string())
        })?;

    debug!(
        "Decoded image: {}x{} {} ({:?}), {} bytes",
        image_info.width,
        image_info.height,
        format_to_extension(image_info.format),
        image_info.source_color,
        image_info.size_bytes
    );

    // 4. Run OCR
    let start = Instant::now();
    let raw = engine.recognize(&image).await.map_err(|e| {
        error!("OCR engine call failed: {}", e);
        ApiError::ProcessingFailed(e.to_string())
    })?;

    // 5. Normalize whatever shape the engine returned
    let result = normalize(&raw);

    info!(
        "OCR complete: {} lines, {:.2}% confidence, {}ms",
        result.line_count,
        result.average_confidence * 100.0,
        start.elapsed().as_millis()
    );
    if result.is_empty() {
        warn!("No text recognized in image");
    }

    Ok(Json(OcrResponse::from(&result)))
}
