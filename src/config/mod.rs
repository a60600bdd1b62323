// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `OCR_*` environment variables, then command-line flags (see [`crate::cli`]).

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::vision::image_utils::DEFAULT_MAX_IMAGE_BYTES;

/// Ports tried in order at startup
pub const DEFAULT_PORTS: &[u16] = &[9001, 9002, 9003, 9004, 9005];

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub ports: Vec<u16>,
    pub max_image_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            ports: DEFAULT_PORTS.to_vec(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl ServerConfig {
    /// Request body cap: the base64 expansion of `max_image_bytes` plus room for the JSON envelope
    pub fn max_body_bytes(&self) -> usize {
        self.max_image_bytes
            .saturating_add(2)
            .saturating_div(3)
            .saturating_mul(4)
            .saturating_add(64 * 1024)
    }
}

/// OCR sidecar settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub startup_retries: u32,
    pub startup_retry_delay_ms: u64,
    pub serialize_calls: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8868".to_string(),
            timeout_secs: 120,
            startup_retries: 3,
            startup_retry_delay_ms: 2000,
            serialize_calls: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

impl GatewayConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Override values from process environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override values from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("OCR_HOST") {
            self.server.host = host;
        }
        if let Some(ports) = lookup("OCR_PORTS") {
            self.server.ports = parse_port_list(&ports)?;
        }
        if let Some(val) = lookup("OCR_MAX_IMAGE_BYTES") {
            self.server.max_image_bytes = parse_var("OCR_MAX_IMAGE_BYTES", &val)?;
        }
        if let Some(url) = lookup("OCR_ENGINE_URL") {
            self.engine.endpoint = url;
        }
        if let Some(val) = lookup("OCR_ENGINE_TIMEOUT_SECS") {
            self.engine.timeout_secs = parse_var("OCR_ENGINE_TIMEOUT_SECS", &val)?;
        }
        if let Some(val) = lookup("OCR_ENGINE_STARTUP_RETRIES") {
            self.engine.startup_retries = parse_var("OCR_ENGINE_STARTUP_RETRIES", &val)?;
        }
        if let Some(val) = lookup("OCR_ENGINE_SERIALIZE") {
            self.engine.serialize_calls = parse_flag(&val)
                .with_context(|| format!("OCR_ENGINE_SERIALIZE: invalid flag '{}'", val))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.server.ports.is_empty(), "at least one listen port is required");
        ensure!(
            !self.server.ports.contains(&0),
            "port 0 is not allowed in the port list"
        );
        ensure!(self.server.max_image_bytes > 0, "max_image_bytes must be positive");
        ensure!(self.engine.timeout_secs > 0, "engine timeout must be positive");

        let endpoint = url::Url::parse(&self.engine.endpoint)
            .with_context(|| format!("invalid engine endpoint '{}'", self.engine.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!(
                "engine endpoint must use http or https, got '{}'",
                endpoint.scheme()
            );
        }
        Ok(())
    }
}

/// Parse a comma-separated port list such as `9001,9002`
pub fn parse_port_list(value: &str) -> Result<Vec<u16>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u16>()
                .with_context(|| format!("invalid port '{}'", part))
        })
        .collect()
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{}: invalid value '{}'", key, value))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
