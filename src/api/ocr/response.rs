// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response types

use serde::{Deserialize, Serialize, Serializer};

use crate::vision::normalizer::RecognitionResult;

/// Warning attached when nothing was recognized
pub const NO_TEXT_WARNING: &str = "未识别到任何文字，请尝试上传更清晰的图片";

/// A recognized line as reported to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineDetail {
    pub text: String,
    /// Confidence percentage (0-100)
    pub confidence: f64,
}

/// Response from OCR processing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrResponse {
    /// All lines joined with `\n`
    pub text: String,
    /// Average confidence percentage (0-100); written as integer `0` when nothing was recognized
    #[serde(serialize_with = "serialize_percent")]
    pub confidence: f64,
    /// Number of recognized lines
    pub lines: usize,
    /// Individual lines in engine order
    pub details: Vec<LineDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<&RecognitionResult> for OcrResponse {
    fn from(result: &RecognitionResult) -> Self {
        Self {
            text: result.combined_text.clone(),
            confidence: to_percent(result.average_confidence),
            lines: result.line_count,
            details: result
                .lines
                .iter()
                .map(|line| LineDetail {
                    text: line.text.clone(),
                    confidence: to_percent(line.confidence),
                })
                .collect(),
            warning: result.is_empty().then(|| NO_TEXT_WARNING.to_string()),
        }
    }
}

fn to_percent(fraction: f64) -> f64 {
    fraction * 100.0
}

fn serialize_percent<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if *value == 0.0 {
        serializer.serialize_u64(0)
    } else {
        serializer.serialize_f64(*value)
    }
}
