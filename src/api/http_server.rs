// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::{any::Any, io, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use super::errors::ApiError;
use super::health::{health_handler, test_handler};
use super::ocr::ocr_handler;
use crate::config::ServerConfig;
use crate::vision::engine::EngineHandle;
use crate::vision::image_utils::DEFAULT_MAX_IMAGE_BYTES;

/// Shared state for all handlers; read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub engine: Option<EngineHandle>,
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new(engine: Option<EngineHandle>, max_image_bytes: usize) -> Self {
        Self {
            engine,
            max_image_bytes,
        }
    }

    /// State with no engine, as seen when initialization never happened
    pub fn new_for_test() -> Self {
        Self::new(None, DEFAULT_MAX_IMAGE_BYTES)
    }

    pub fn is_engine_ready(&self) -> bool {
        self.engine.is_some()
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("no port available on {host} (tried {ports:?})")]
    NoPortAvailable { host: String, ports: Vec<u16> },

    #[error("server error: {0}")]
    Io(#[from] io::Error),
}

/// Build the gateway router
pub fn create_app(state: Arc<AppState>) -> Router {
    create_app_with_body_limit(state, ServerConfig::default().max_body_bytes())
}

pub fn create_app_with_body_limit(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/test", get(test_handler))
        .route("/ocr", post(ocr_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .with_state(state)
}

/// Bind the first port in `ports` that is free on `host`
pub async fn bind_first_available(host: &str, ports: &[u16]) -> Result<TcpListener, ServeError> {
    for &port in ports {
        info!("Trying to bind {}:{}", host, port);
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => warn!("Port {} unavailable: {}", port, e),
        }
    }

    error!("All candidate ports are in use: {:?}", ports);
    Err(ServeError::NoPortAvailable {
        host: host.to_string(),
        ports: ports.to_vec(),
    })
}

/// Serve on an already bound listener until Ctrl-C
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServeError> {
    info!("OCR gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("OCR gateway stopped");
    Ok(())
}

/// Bind using the port fallback list and serve
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), ServeError> {
    let listener = bind_first_available(&config.host, &config.ports).await?;
    let app = create_app_with_body_limit(Arc::new(state), config.max_body_bytes());
    serve(listener, app).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", message);

    let err = ApiError::ProcessingFailed(message);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(err.to_response())).into_response()
}
