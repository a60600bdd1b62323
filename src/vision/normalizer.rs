// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Normalization of raw PaddleOCR engine output
//!
//! PaddleOCR has shipped several result layouts over its lifetime and the
//! sidecar hands them to us untouched:
//! - new `predict()` API: a mapping of parallel `rec_texts` / `rec_scores` arrays
//!   (or a list of such mappings, one per page)
//! - legacy `ocr()` API: `[[ [box, [text, score]], ... ], ...]`
//! - degenerate shapes: `null`, `[]`, `[null]`, scalars
//!
//! [`normalize`] turns any of them into a [`RecognitionResult`]. It never fails:
//! entries that do not fit the expected shape are dropped one by one.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Key holding recognized strings in the mapping layout
pub const REC_TEXTS_KEY: &str = "rec_texts";

/// Key holding recognition scores in the mapping layout
pub const REC_SCORES_KEY: &str = "rec_scores";

/// One recognized text span
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizedLine {
    /// Recognized text, never blank
    pub text: String,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f64,
}

impl RecognizedLine {
    /// Build a line, rejecting text that is empty after trimming
    pub fn new(text: impl Into<String>, confidence: f64) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self { text, confidence })
    }
}

/// Canonical recognition result for one image
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionResult {
    /// Line texts joined with `\n`
    pub combined_text: String,
    /// Mean line confidence (0.0-1.0), 0 when no lines were recognized
    pub average_confidence: f64,
    /// Number of recognized lines
    pub line_count: usize,
    /// Lines in engine order
    pub lines: Vec<RecognizedLine>,
}

impl RecognitionResult {
    pub fn from_lines(lines: Vec<RecognizedLine>) -> Self {
        let line_count = lines.len();
        let combined_text = lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let average_confidence = if line_count == 0 {
            0.0
        } else {
            lines.iter().map(|line| line.confidence).sum::<f64>() / line_count as f64
        };

        Self {
            combined_text,
            average_confidence,
            line_count,
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Raw engine output classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum RawOcrOutput<'a> {
    /// Parallel `rec_texts` / `rec_scores` arrays (empty when either key is missing)
    Mapping {
        texts: &'a [Value],
        scores: &'a [Value],
    },
    /// Legacy nested list of lines
    Sequence(&'a [Value]),
    /// Anything else
    Unrecognized,
}

impl<'a> RawOcrOutput<'a> {
    /// Inspect the top-level shape of a raw engine result
    pub fn classify(raw: &'a Value) -> Self {
        match raw {
            Value::Object(map) => classify_mapping(map),
            Value::Array(lines) if !lines.is_empty() => RawOcrOutput::Sequence(lines),
            other => {
                warn!("Unrecognized OCR result shape: {}", shape_name(other));
                RawOcrOutput::Unrecognized
            }
        }
    }

    /// Extract recognized lines, in encounter order
    pub fn into_lines(self) -> Vec<RecognizedLine> {
        match self {
            RawOcrOutput::Mapping { texts, scores } => mapping_lines(texts, scores),
            RawOcrOutput::Sequence(lines) => lines
                .iter()
                .enumerate()
                .flat_map(|(line_idx, line)| sequence_line(line_idx, line))
                .collect(),
            RawOcrOutput::Unrecognized => Vec::new(),
        }
    }
}

/// Normalize a raw engine result into a [`RecognitionResult`]
pub fn normalize(raw: &Value) -> RecognitionResult {
    let result = RecognitionResult::from_lines(RawOcrOutput::classify(raw).into_lines());
    debug!(
        "Normalized OCR result: {} lines, average confidence {:.4}",
        result.line_count, result.average_confidence
    );
    result
}

fn classify_mapping(map: &Map<String, Value>) -> RawOcrOutput<'_> {
    match (map.get(REC_TEXTS_KEY), map.get(REC_SCORES_KEY)) {
        (Some(Value::Array(texts)), Some(Value::Array(scores))) => {
            if texts.len() != scores.len() {
                warn!(
                    "{} has {} entries but {} has {}",
                    REC_TEXTS_KEY,
                    texts.len(),
                    REC_SCORES_KEY,
                    scores.len()
                );
            }
            RawOcrOutput::Mapping { texts, scores }
        }
        _ => {
            warn!(
                "OCR result mapping lacks usable {}/{}, available keys: {:?}",
                REC_TEXTS_KEY,
                REC_SCORES_KEY,
                map.keys().collect::<Vec<_>>()
            );
            RawOcrOutput::Mapping {
                texts: &[],
                scores: &[],
            }
        }
    }
}

fn mapping_lines(texts: &[Value], scores: &[Value]) -> Vec<RecognizedLine> {
    texts
        .iter()
        .zip(scores)
        .enumerate()
        .filter_map(|(idx, (text, score))| {
            let line = coerce_text(text)
                .zip(coerce_confidence(score))
                .and_then(|(text, confidence)| RecognizedLine::new(text, confidence));
            if line.is_none() {
                debug!("Skipping mapping entry {}: text={} score={}", idx, text, score);
            }
            line
        })
        .collect()
}

fn sequence_line(line_idx: usize, line: &Value) -> Vec<RecognizedLine> {
    match line {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(item_idx, item)| {
                let parsed = sequence_item(item);
                if parsed.is_none() {
                    debug!("Skipping line {} item {}: {}", line_idx, item_idx, item);
                }
                parsed
            })
            .collect(),
        // One mapping per page, as returned by PaddleOCR 3.x predict()
        Value::Object(map) => match classify_mapping(map) {
            RawOcrOutput::Mapping { texts, scores } => mapping_lines(texts, scores),
            _ => Vec::new(),
        },
        Value::Null => Vec::new(),
        other => {
            debug!("Skipping line {}: {} is not a list", line_idx, shape_name(other));
            Vec::new()
        }
    }
}

/// `[box, [text, score]]`; extra trailing elements are ignored
fn sequence_item(item: &Value) -> Option<RecognizedLine> {
    let parts = item.as_array().filter(|parts| parts.len() >= 2)?;
    let text_info = parts[1].as_array().filter(|info| info.len() >= 2)?;
    let text = coerce_text(&text_info[0])?;
    let confidence = coerce_confidence(&text_info[1])?;
    RecognizedLine::new(text, confidence)
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn coerce_confidence(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    score.is_finite().then(|| score.clamp(0.0, 1.0))
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(items) if items.is_empty() => "empty list",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
