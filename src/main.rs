// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use paddle_ocr_gateway::{
    api::{start_server, AppState},
    cli::Cli,
    vision::{EngineHandle, HttpOcrEngine},
};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting {}", paddle_ocr_gateway::version::get_version_string());
    info!("Build: {}", paddle_ocr_gateway::version::VERSION);

    let config = cli.load_config().context("invalid configuration")?;

    // The engine is set once here and only read afterwards
    info!("Connecting to OCR engine at {}...", config.engine.endpoint);
    let engine = match HttpOcrEngine::connect(&config.engine).await {
        Ok(engine) => engine,
        Err(e) => {
            error!("OCR engine initialization failed, server cannot start: {}", e);
            return Err(e).context("OCR engine initialization failed");
        }
    };
    let engine = EngineHandle::new(Arc::new(engine), config.engine.serialize_calls);
    info!(
        "OCR engine '{}' ready (serialized calls: {})",
        engine.name(),
        engine.is_serialized()
    );

    let state = AppState::new(Some(engine), config.server.max_image_bytes);
    start_server(&config.server, state)
        .await
        .context("OCR gateway failed")?;

    Ok(())
}
