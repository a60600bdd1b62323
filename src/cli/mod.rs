// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::GatewayConfig;

/// PaddleOCR gateway
#[derive(Parser, Debug, Default)]
#[command(name = "paddle-ocr-gateway")]
#[command(about = "HTTP gateway normalizing PaddleOCR results", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "OCR_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Ports to try in order (repeatable or comma-separated)
    #[arg(long = "port", value_delimiter = ',')]
    pub ports: Vec<u16>,

    /// OCR sidecar base URL
    #[arg(long)]
    pub engine_url: Option<String>,
}

impl Cli {
    /// Build the effective configuration: defaults, file, environment, then flags
    pub fn load_config(&self) -> Result<GatewayConfig> {
        let mut config = match &self.config {
            Some(path) => GatewayConfig::from_file(path)?,
            None => GatewayConfig::default(),
        };
        config.apply_env()?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut GatewayConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if !self.ports.is_empty() {
            config.server.ports = self.ports.clone();
        }
        if let Some(url) = &self.engine_url {
            config.engine.endpoint = url.clone();
        }
    }
}
