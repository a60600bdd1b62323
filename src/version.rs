// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the PaddleOCR gateway

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-result-normalizer-2026-10-18";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-18";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "rec-texts-mapping",
    "legacy-nested-lines",
    "per-page-mappings",
    "data-url-images",
    "rgb-normalization",
    "port-fallback",
    "serialized-engine-calls",
    "legacy-route-fallback",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("PaddleOCR Gateway {} ({})", VERSION_NUMBER, BUILD_DATE)
}
