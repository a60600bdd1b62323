// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for the OCR gateway
//!
//! This module provides:
//! - image decoding and RGB normalization of uploaded payloads
//! - the OCR engine capability and its PaddleOCR sidecar client
//! - normalization of the engine's raw, version-dependent results

pub mod engine;
pub mod image_utils;
pub mod normalizer;

pub use engine::{EngineError, EngineHandle, HttpOcrEngine, OcrEngine};
pub use image_utils::{decode_base64_image, decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use normalizer::{normalize, RawOcrOutput, RecognitionResult, RecognizedLine};
