// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine capability and the PaddleOCR sidecar client
//!
//! Recognition itself runs out of process. The gateway only needs something
//! that takes an RGB image and returns the engine's raw, untyped result;
//! [`HttpOcrEngine`] provides that over HTTP and [`EngineHandle`] wraps any
//! engine for shared use by request handlers.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbImage};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;

/// Route served by PaddleOCR 3.x style sidecars
const PREDICT_ROUTE: &str = "predict";

/// Route served by sidecars wrapping the legacy `ocr()` call
const LEGACY_ROUTE: &str = "ocr";

/// Longest upstream error body kept in [`EngineError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("engine returned invalid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("failed to encode image for engine: {0}")]
    Encode(#[from] image::ImageError),

    #[error("engine at {endpoint} not ready after {attempts} attempts")]
    NotReady { endpoint: String, attempts: u32 },

    #[error("{0}")]
    Other(String),
}

/// An OCR backend producing raw, version-dependent results
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short human-readable backend name
    fn name(&self) -> &'static str;

    /// Run recognition on an RGB image and return the engine's raw output
    async fn recognize(&self, image: &RgbImage) -> Result<Value, EngineError>;
}

/// Shared, read-only engine handle injected into request handlers
///
/// When `serialize_calls` is set, at most one recognition runs at a time.
#[derive(Clone)]
pub struct EngineHandle {
    engine: Arc<dyn OcrEngine>,
    call_lock: Option<Arc<Mutex<()>>>,
}

impl EngineHandle {
    pub fn new(engine: Arc<dyn OcrEngine>, serialize_calls: bool) -> Self {
        Self {
            engine,
            call_lock: serialize_calls.then(|| Arc::new(Mutex::new(()))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn is_serialized(&self) -> bool {
        self.call_lock.is_some()
    }

    pub async fn recognize(&self, image: &RgbImage) -> Result<Value, EngineError> {
        let _guard = match &self.call_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };
        self.engine.recognize(image).await
    }
}

/// Client for a PaddleOCR inference sidecar
///
/// Posts `{"image": "<base64 PNG>"}` to `/predict`. Sidecars that only expose
/// the legacy `/ocr` route are detected on the first 404/405 and used from
/// then on.
pub struct HttpOcrEngine {
    client: Client,
    endpoint: String,
    use_legacy_route: AtomicBool,
}

impl HttpOcrEngine {
    /// Create a new sidecar client without contacting it
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!("OCR engine client configured: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            use_legacy_route: AtomicBool::new(false),
        })
    }

    /// Create a client and wait until the sidecar reports healthy
    pub async fn connect(config: &EngineConfig) -> Result<Self, EngineError> {
        let engine = Self::new(&config.endpoint, Duration::from_secs(config.timeout_secs))?;
        let attempts = config.startup_retries.max(1);

        for attempt in 1..=attempts {
            if engine.health_check().await {
                info!("OCR engine ready at {} (attempt {})", engine.endpoint, attempt);
                return Ok(engine);
            }
            warn!(
                "OCR engine at {} not ready (attempt {}/{})",
                engine.endpoint, attempt, attempts
            );
            if attempt < attempts {
                tokio::time::sleep(Duration::from_millis(config.startup_retry_delay_ms)).await;
            }
        }

        Err(EngineError::NotReady {
            endpoint: engine.endpoint,
            attempts,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if the sidecar is healthy
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("OCR engine health check failed: {}", e);
                false
            }
        }
    }

    async fn post(&self, route: &str, body: &Value) -> Result<reqwest::Response, EngineError> {
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, route))
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    fn name(&self) -> &'static str {
        "paddleocr-sidecar"
    }

    async fn recognize(&self, image: &RgbImage) -> Result<Value, EngineError> {
        let body = serde_json::json!({ "image": encode_png_base64(image)? });

        let mut response = if self.use_legacy_route.load(Ordering::Relaxed) {
            self.post(LEGACY_ROUTE, &body).await?
        } else {
            self.post(PREDICT_ROUTE, &body).await?
        };

        if !self.use_legacy_route.load(Ordering::Relaxed)
            && matches!(
                response.status(),
                StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
            )
        {
            info!(
                "OCR engine has no /{} route, falling back to /{}",
                PREDICT_ROUTE, LEGACY_ROUTE
            );
            self.use_legacy_route.store(true, Ordering::Relaxed);
            response = self.post(LEGACY_ROUTE, &body).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Encode an RGB image as base64 PNG
pub fn encode_png_base64(image: &RgbImage) -> Result<String, EngineError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(STANDARD.encode(buf.into_inner()))
}
